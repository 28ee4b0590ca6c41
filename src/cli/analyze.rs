//! `prcost repo` / `prcost org` commands — batch analyses with progress

use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::ProgressBar;

use super::CommandContext;
use crate::cache::FetchCache;
use crate::github::{parse_owner_repo, GithubClient};
use crate::orchestrator::{AnalysisReport, AnalyzeError, Orchestrator, SampleState};
use crate::reporters;

type ProductionOrchestrator = Orchestrator<GithubClient, FetchCache<GithubClient>>;

pub fn run_repo(slug: &str, days: u64, samples: usize, ctx: &CommandContext) -> Result<()> {
    let (owner, repo) =
        parse_owner_repo(slug).with_context(|| format!("cannot analyze '{slug}'"))?;
    run_analysis(ctx, samples, move |orch| {
        orch.analyze_repo(&owner, &repo, days, samples)
    })
}

pub fn run_org(org: &str, days: u64, samples: usize, ctx: &CommandContext) -> Result<()> {
    let org = org.to_string();
    run_analysis(ctx, samples, move |orch| {
        orch.analyze_org(&org, days, samples)
    })
}

fn run_analysis<F>(ctx: &CommandContext, samples: usize, run: F) -> Result<()>
where
    F: FnOnce(&ProductionOrchestrator) -> Result<AnalysisReport, AnalyzeError>,
{
    // The bar length is the requested sample count; the callback trims it
    // once the real (possibly smaller) total is known.
    let bar = ProgressBar::new(samples as u64);
    let callback_bar = bar.clone();

    let orchestrator = ctx.orchestrator().with_progress(Arc::new(
        move |_summary, state, done, total| {
            callback_bar.set_length(total as u64);
            if matches!(state, SampleState::Complete | SampleState::Error) {
                callback_bar.set_position(done as u64);
            }
        },
    ));

    let result = run(&orchestrator);
    bar.finish_and_clear();
    let report = result.context("analysis failed")?;

    let rendered = reporters::render_report(&report, ctx.format)?;
    ctx.emit(&rendered)
}
