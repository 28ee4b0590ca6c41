//! `prcost pr` command — single-PR cost breakdown

use anyhow::{Context, Result};

use super::CommandContext;
use crate::github::parse_pr_url;
use crate::reporters;

pub fn run(url: &str, ctx: &CommandContext) -> Result<()> {
    let (owner, repo, number) =
        parse_pr_url(url).with_context(|| format!("cannot analyze '{url}'"))?;

    let orchestrator = ctx.orchestrator();
    let breakdown = orchestrator
        .analyze_pr(&owner, &repo, number)
        .with_context(|| format!("failed to analyze {owner}/{repo}#{number}"))?;

    let rendered = reporters::render_breakdown(&breakdown, ctx.format)?;
    ctx.emit(&rendered)
}
