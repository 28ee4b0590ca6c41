//! CLI command definitions and handlers

mod analyze;
mod init;
mod pr;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;

use crate::cache::{default_cache_dir, FetchCache};
use crate::config::{load_project_config, CliDefaults, CostConfig};
use crate::github::{token_from_env, GithubClient};
use crate::orchestrator::{Orchestrator, DEFAULT_SAMPLES, DEFAULT_WORKERS};
use crate::reporters::OutputFormat;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Parse a positive dollar amount or multiplier
fn parse_positive(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err("value must be positive".to_string())
    }
}

/// prcost - what does that pull request actually cost?
///
/// Estimates the dollar and productivity-hour cost of PR activity from the
/// public GitHub API: author effort, review effort, and the delay cost of
/// PRs sitting unmerged.
#[derive(Parser, Debug)]
#[command(name = "prcost")]
#[command(
    version,
    about = "Estimate the dollar cost of pull requests for a PR, a repo, or a whole org",
    after_help = "\
Examples:
  prcost pr https://github.com/rust-lang/cargo/pull/12345
  prcost repo rust-lang/cargo --days 30 --samples 40
  prcost org my-company --days 90 --format json -o report.json
  prcost init                        Write a prcost.toml with the defaults

Authentication: set GITHUB_TOKEN (or GH_TOKEN), or pass --token. Anonymous
access works for public repos at a much lower rate limit."
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Output format: text, json, markdown (or md)
    #[arg(long, short = 'f', global = true, value_parser = ["text", "json", "markdown", "md"])]
    pub format: Option<String>,

    /// Write output to a file instead of stdout
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,

    /// GitHub API token (falls back to GITHUB_TOKEN / GH_TOKEN)
    #[arg(long, global = true, env = "PRCOST_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Bypass the on-disk fetch cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Annual salary used for the hourly rate (default 249000)
    #[arg(long, global = true, value_parser = parse_positive)]
    pub salary: Option<f64>,

    /// Fully-loaded benefits multiplier (default 1.3)
    #[arg(long, global = true, value_parser = parse_positive)]
    pub benefits: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a single PR by URL
    Pr {
        /// PR URL, e.g. https://github.com/OWNER/REPO/pull/123
        url: String,
    },

    /// Analyze a repository over a trailing window
    Repo {
        /// Repository slug, e.g. rust-lang/cargo
        slug: String,

        /// Trailing window in days
        #[arg(long)]
        days: Option<u64>,

        /// How many PRs to sample from the window
        #[arg(long)]
        samples: Option<usize>,
    },

    /// Analyze every repository of an organization
    Org {
        /// Organization login
        org: String,

        /// Trailing window in days
        #[arg(long)]
        days: Option<u64>,

        /// How many PRs to sample from the window
        #[arg(long)]
        samples: Option<usize>,
    },

    /// Write a prcost.toml config file with the default settings
    Init,
}

/// Resolved settings shared by every command: CLI flags layered over
/// prcost.toml layered over the built-in defaults.
pub(crate) struct CommandContext {
    pub config: CostConfig,
    pub workers: usize,
    pub days: u64,
    pub samples: usize,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub token: Option<String>,
    pub no_cache: bool,
}

impl CommandContext {
    fn resolve(cli: &Cli, defaults: &CliDefaults, file_config: Option<CostConfig>) -> Result<Self> {
        let mut config = file_config.unwrap_or_default();
        if let Some(salary) = cli.salary {
            config.annual_salary = salary;
        }
        if let Some(benefits) = cli.benefits {
            config.benefits_multiplier = benefits;
        }
        config.validate().context("invalid cost configuration")?;

        let format_name = cli
            .format
            .clone()
            .or_else(|| defaults.format.clone())
            .unwrap_or_else(|| "text".to_string());

        Ok(Self {
            config,
            workers: cli.workers.or(defaults.workers).unwrap_or(DEFAULT_WORKERS),
            days: defaults.days.unwrap_or(30),
            samples: defaults.samples.unwrap_or(DEFAULT_SAMPLES),
            format: OutputFormat::from_str(&format_name)?,
            output: cli.output.clone(),
            token: cli.token.clone(),
            no_cache: cli.no_cache,
        })
    }

    /// Build the production orchestrator: GitHub client for listing, a
    /// cached GitHub client for fetching.
    pub fn orchestrator(&self) -> Orchestrator<GithubClient, FetchCache<GithubClient>> {
        let token = self.token.clone().or_else(token_from_env);
        let source = GithubClient::new(token.clone());
        let cache_dir = if self.no_cache {
            None
        } else {
            default_cache_dir()
        };
        let fetcher = FetchCache::with_dir(GithubClient::new(token), cache_dir);
        Orchestrator::new(source, fetcher, self.config.clone()).with_workers(self.workers)
    }

    /// Print to stdout or write to the requested file.
    pub fn emit(&self, content: &str) -> Result<()> {
        match &self.output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Wrote {}", style(path.display()).cyan());
                Ok(())
            }
            None => {
                println!("{content}");
                Ok(())
            }
        }
    }
}

/// Dispatch a parsed CLI invocation.
pub fn run(cli: Cli) -> Result<()> {
    let project = load_project_config(Path::new("."));
    let ctx = CommandContext::resolve(&cli, &project.defaults, project.cost)?;

    match cli.command {
        Commands::Pr { ref url } => pr::run(url, &ctx),
        Commands::Repo {
            ref slug,
            days,
            samples,
        } => analyze::run_repo(slug, days.unwrap_or(ctx.days), samples.unwrap_or(ctx.samples), &ctx),
        Commands::Org {
            ref org,
            days,
            samples,
        } => analyze::run_org(org, days.unwrap_or(ctx.days), samples.unwrap_or(ctx.samples), &ctx),
        Commands::Init => init::run(),
    }
}
