//! GitHub data access
//!
//! The cost model only ever sees two collaborator interfaces: a
//! [`PrSource`] that lists PR summaries and counts open PRs, and a
//! [`PrFetcher`] that turns one summary into full timeline data. The
//! orchestrator is generic over both, so tests drive it with in-memory
//! fakes and the CLI plugs in the real [`GithubClient`] (wrapped in the
//! fetch cache).
//!
//! Uses ureq (sync HTTP) — no async runtime needed.

mod client;
mod types;
mod urls;

pub use client::GithubClient;
pub use urls::{parse_owner_repo, parse_pr_url};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{PrData, PrSummary};

/// Errors from talking to the GitHub API.
#[derive(Error, Debug)]
pub enum GithubError {
    #[error("invalid PR reference '{0}': expected https://github.com/OWNER/REPO/pull/NUMBER")]
    InvalidUrl(String),

    #[error("access denied for {0}: check your token and its scopes")]
    AccessDenied(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited by the GitHub API; retry later or supply a token")]
    RateLimited,

    #[error("request failed: {0}")]
    Http(String),

    #[error("failed to parse API response: {0}")]
    Parse(String),
}

pub type GithubResult<T> = Result<T, GithubError>;

/// Lists PR summaries and counts open PRs for a repo or a whole org.
///
/// Implementations must return summaries in `updated_at`-descending order
/// and may return at most 1000 of them (the search API hard cap); callers
/// detect saturation by seeing exactly 1000 results.
pub trait PrSource: Sync {
    /// List PRs updated since the given instant. `repo = None` means the
    /// whole organization.
    fn list_prs(
        &self,
        owner: &str,
        repo: Option<&str>,
        since: DateTime<Utc>,
    ) -> GithubResult<Vec<PrSummary>>;

    /// Count currently open PRs.
    fn count_open_prs(&self, owner: &str, repo: Option<&str>) -> GithubResult<u64>;
}

/// Fetches the full timeline data for one PR.
///
/// The summary's `updated_at` doubles as the cache key: a second call with
/// an unchanged timestamp may be served from cache.
pub trait PrFetcher: Sync {
    fn fetch_pr(&self, summary: &PrSummary) -> GithubResult<PrData>;
}

/// Whether a login belongs to an automation account.
///
/// GitHub marks app-driven accounts with a `[bot]` login suffix and a
/// `Bot` user type; a few well-known automation accounts predate both.
pub fn is_bot_login(login: &str) -> bool {
    const KNOWN_BOTS: &[&str] = &["dependabot", "renovate", "github-actions", "greenkeeper"];
    login.ends_with("[bot]") || KNOWN_BOTS.contains(&login)
}

/// Read an API token from the conventional environment variables.
pub fn token_from_env() -> Option<String> {
    for key in ["GITHUB_TOKEN", "GH_TOKEN"] {
        if let Ok(token) = std::env::var(key) {
            if !token.trim().is_empty() {
                return Some(token);
            }
        }
    }
    None
}
