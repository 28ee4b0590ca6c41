//! Raw GitHub API response shapes
//!
//! Only the fields the cost model needs are declared; everything else in
//! the payloads is ignored. All fields default so a missing key never
//! fails the whole analysis.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct User {
    #[serde(default)]
    pub login: String,
    /// "User", "Bot", or "Organization".
    #[serde(default, rename = "type")]
    pub user_type: String,
}

impl User {
    pub fn is_bot(&self) -> bool {
        self.user_type == "Bot" || super::is_bot_login(&self.login)
    }
}

/// Response of `GET /search/issues`.
#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchItem {
    pub number: u64,
    #[serde(default)]
    pub user: Option<User>,
    pub updated_at: DateTime<Utc>,
    /// "open" or "closed".
    #[serde(default)]
    pub state: String,
    /// Issue search returns repo identity only via the API URL,
    /// e.g. `https://api.github.com/repos/OWNER/REPO`.
    #[serde(default)]
    pub repository_url: String,
    #[serde(default)]
    pub pull_request: Option<PullRequestRef>,
}

impl SearchItem {
    /// Extract (owner, repo) from `repository_url`.
    pub fn owner_repo(&self) -> Option<(String, String)> {
        let rest = self.repository_url.split("/repos/").nth(1)?;
        let mut parts = rest.split('/');
        let owner = parts.next()?;
        let repo = parts.next()?;
        if owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some((owner.to_string(), repo.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PullRequestRef {
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// Response of `GET /repos/{owner}/{repo}/pulls/{number}`.
#[derive(Debug, Deserialize)]
pub(super) struct PullResponse {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub user: Option<User>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// One element of `GET /pulls/{number}/commits`.
#[derive(Debug, Deserialize)]
pub(super) struct CommitItem {
    #[serde(default)]
    pub author: Option<User>,
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommitDetail {
    #[serde(default)]
    pub author: Option<GitSignature>,
    #[serde(default)]
    pub committer: Option<GitSignature>,
}

impl CommitItem {
    /// Best-effort commit timestamp: git author date, else committer date.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.commit
            .author
            .as_ref()
            .and_then(|s| s.date)
            .or_else(|| self.commit.committer.as_ref().and_then(|s| s.date))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct GitSignature {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// One element of `GET /pulls/{number}/reviews`.
#[derive(Debug, Deserialize)]
pub(super) struct ReviewItem {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// One element of the issue- and review-comment listings.
#[derive(Debug, Deserialize)]
pub(super) struct CommentItem {
    #[serde(default)]
    pub user: Option<User>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_item_owner_repo() {
        let item: SearchItem = serde_json::from_str(
            r#"{
                "number": 5,
                "updated_at": "2024-05-01T12:00:00Z",
                "state": "open",
                "repository_url": "https://api.github.com/repos/acme/widget"
            }"#,
        )
        .unwrap();
        assert_eq!(
            item.owner_repo(),
            Some(("acme".to_string(), "widget".to_string()))
        );
    }

    #[test]
    fn bot_user_type_is_detected() {
        let user: User =
            serde_json::from_str(r#"{"login": "some-app[bot]", "type": "Bot"}"#).unwrap();
        assert!(user.is_bot());
        let human: User = serde_json::from_str(r#"{"login": "alice", "type": "User"}"#).unwrap();
        assert!(!human.is_bot());
    }

    #[test]
    fn pull_response_parses_minimal_payload() {
        let pull: PullResponse = serde_json::from_str(
            r#"{
                "title": "Add widget",
                "html_url": "https://github.com/acme/widget/pull/5",
                "user": {"login": "alice", "type": "User"},
                "created_at": "2024-05-01T09:00:00Z",
                "closed_at": null,
                "additions": 120,
                "deletions": 8
            }"#,
        )
        .unwrap();
        assert_eq!(pull.additions, 120);
        assert!(pull.closed_at.is_none());
    }
}
