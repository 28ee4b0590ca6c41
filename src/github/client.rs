//! GitHub API client — sync HTTP via ureq (no tokio needed)
//!
//! Listing goes through the search API (`/search/issues`), which caps
//! results at 1000 items; fetching one PR fans out to the pull, commits,
//! reviews, and comment endpoints. Bot events are dropped at this layer so
//! the cost model never sees them.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{CommentItem, CommitItem, PullResponse, ReviewItem, SearchResponse};
use super::{GithubError, GithubResult, PrFetcher, PrSource};
use crate::models::{EventKind, ParticipantEvent, PrData, PrState, PrSummary};

/// Search API hard cap: 10 pages of 100 results.
const MAX_SEARCH_PAGES: u64 = 10;
const PAGE_SIZE: usize = 100;

pub struct GithubClient {
    agent: ureq::Agent,
    token: Option<String>,
    api_base: String,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // We handle status codes ourselves
        .timeout_global(Some(std::time::Duration::from_secs(30)))
        .build()
        .new_agent()
}

/// Build the search query string, pre-encoded for the q= parameter.
fn search_query(owner: &str, repo: Option<&str>, extra: &str) -> String {
    let scope = match repo {
        Some(repo) => format!("repo:{owner}/{repo}"),
        None => format!("org:{owner}"),
    };
    format!("{scope}+is:pr{extra}")
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            agent: make_agent(),
            token,
            api_base: "https://api.github.com".to_string(),
        }
    }

    /// Point the client at a different API host (test servers, GHE).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> GithubResult<T> {
        debug!("GET {url}");
        let mut request = self
            .agent
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "prcost")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let mut response = request
            .call()
            .map_err(|e| GithubError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        match status {
            200..=299 => response
                .body_mut()
                .read_json::<T>()
                .map_err(|e| GithubError::Parse(e.to_string())),
            401 => Err(GithubError::AccessDenied(url.to_string())),
            403 => {
                let exhausted = response
                    .headers()
                    .get("x-ratelimit-remaining")
                    .and_then(|v| v.to_str().ok())
                    == Some("0");
                if exhausted {
                    Err(GithubError::RateLimited)
                } else {
                    Err(GithubError::AccessDenied(url.to_string()))
                }
            }
            404 => Err(GithubError::NotFound(url.to_string())),
            429 => Err(GithubError::RateLimited),
            _ => {
                let text = response.body_mut().read_to_string().unwrap_or_default();
                Err(GithubError::Http(format!("HTTP {status}: {text}")))
            }
        }
    }

    /// Fetch every page of a list endpoint, up to the search-style cap.
    fn get_paged<T: DeserializeOwned>(&self, base_url: &str) -> GithubResult<Vec<T>> {
        let separator = if base_url.contains('?') { '&' } else { '?' };
        let mut out = Vec::new();
        for page in 1..=MAX_SEARCH_PAGES {
            let url = format!("{base_url}{separator}per_page={PAGE_SIZE}&page={page}");
            let items: Vec<T> = self.get_json(&url)?;
            let fetched = items.len();
            out.extend(items);
            if fetched < PAGE_SIZE {
                break;
            }
        }
        Ok(out)
    }
}

impl PrSource for GithubClient {
    fn list_prs(
        &self,
        owner: &str,
        repo: Option<&str>,
        since: DateTime<Utc>,
    ) -> GithubResult<Vec<PrSummary>> {
        // ">=" must be pre-encoded; the rest of the query survives as-is.
        let since_stamp = since.format("%Y-%m-%dT%H:%M:%SZ");
        let query = search_query(owner, repo, &format!("+updated:%3E%3D{since_stamp}"));

        let mut summaries = Vec::new();
        for page in 1..=MAX_SEARCH_PAGES {
            let url = format!(
                "{}/search/issues?q={query}&sort=updated&order=desc&per_page={PAGE_SIZE}&page={page}",
                self.api_base
            );
            let response: SearchResponse = self.get_json(&url)?;
            let fetched = response.items.len();

            for item in response.items {
                // Org-wide search spans repos; repo identity rides along in
                // the repository_url.
                let Some((item_owner, item_repo)) = item.owner_repo() else {
                    continue;
                };
                summaries.push(PrSummary {
                    owner: item_owner,
                    repo: item_repo,
                    number: item.number,
                    author: item.user.map(|u| u.login).unwrap_or_default(),
                    updated_at: item.updated_at,
                    state: if item.state == "open" {
                        PrState::Open
                    } else {
                        PrState::Closed
                    },
                    merged: item
                        .pull_request
                        .and_then(|p| p.merged_at)
                        .is_some(),
                });
            }

            if fetched < PAGE_SIZE || summaries.len() >= 1000 {
                break;
            }
        }

        summaries.truncate(1000);
        // The API returns updated-descending already; re-sort as a defense
        // so downstream saturation detection can trust the ordering.
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        debug!("listed {} PR summaries for {owner}", summaries.len());
        Ok(summaries)
    }

    fn count_open_prs(&self, owner: &str, repo: Option<&str>) -> GithubResult<u64> {
        let query = search_query(owner, repo, "+is:open");
        let url = format!(
            "{}/search/issues?q={query}&per_page=1",
            self.api_base
        );
        let response: SearchResponse = self.get_json(&url)?;
        Ok(response.total_count)
    }
}

impl PrFetcher for GithubClient {
    fn fetch_pr(&self, summary: &PrSummary) -> GithubResult<PrData> {
        let base = format!(
            "{}/repos/{}/{}",
            self.api_base, summary.owner, summary.repo
        );
        let number = summary.number;

        let pull: PullResponse = self.get_json(&format!("{base}/pulls/{number}"))?;
        let author = pull
            .user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_default();
        let author_is_bot = pull.user.as_ref().map(|u| u.is_bot()).unwrap_or(false);

        let mut events = Vec::new();

        let commits: Vec<CommitItem> =
            self.get_paged(&format!("{base}/pulls/{number}/commits"))?;
        for commit in commits {
            if commit.author.as_ref().is_some_and(|u| u.is_bot()) {
                continue;
            }
            let Some(timestamp) = commit.timestamp() else {
                continue;
            };
            // Commits without a linked account still belong to the PR.
            let actor = commit
                .author
                .map(|u| u.login)
                .filter(|login| !login.is_empty())
                .unwrap_or_else(|| author.clone());
            events.push(ParticipantEvent::new(timestamp, actor, EventKind::Commit));
        }

        let reviews: Vec<ReviewItem> =
            self.get_paged(&format!("{base}/pulls/{number}/reviews"))?;
        for review in reviews {
            let Some(user) = review.user else { continue };
            let Some(timestamp) = review.submitted_at else {
                continue;
            };
            if user.is_bot() {
                continue;
            }
            events.push(ParticipantEvent::new(timestamp, user.login, EventKind::Review));
        }

        let review_comments: Vec<CommentItem> =
            self.get_paged(&format!("{base}/pulls/{number}/comments"))?;
        for comment in review_comments {
            let Some(user) = comment.user else { continue };
            if user.is_bot() {
                continue;
            }
            events.push(ParticipantEvent::new(
                comment.created_at,
                user.login,
                EventKind::ReviewComment,
            ));
        }

        let issue_comments: Vec<CommentItem> =
            self.get_paged(&format!("{base}/issues/{number}/comments"))?;
        for comment in issue_comments {
            let Some(user) = comment.user else { continue };
            if user.is_bot() {
                continue;
            }
            events.push(ParticipantEvent::new(
                comment.created_at,
                user.login,
                EventKind::Comment,
            ));
        }

        let url = if pull.html_url.is_empty() {
            summary.url()
        } else {
            pull.html_url
        };

        Ok(PrData {
            url,
            title: pull.title,
            author,
            author_is_bot,
            created_at: pull.created_at,
            closed_at: pull.closed_at,
            lines_added: pull.additions,
            // Deletions approximate touched-existing lines: a modified line
            // shows up as one deletion plus one addition in the diff stat.
            lines_modified: pull.deletions,
            events,
        })
    }
}
