//! PR URL and repo-slug parsing

use super::{GithubError, GithubResult};

/// Parse a PR web URL into (owner, repo, number).
///
/// Accepts `https://github.com/OWNER/REPO/pull/NUMBER` with an optional
/// scheme, trailing slash, or trailing sub-path (`/files`, `/commits`).
pub fn parse_pr_url(url: &str) -> GithubResult<(String, String, u64)> {
    let trimmed = url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");

    let rest = trimmed
        .strip_prefix("github.com/")
        .ok_or_else(|| GithubError::InvalidUrl(url.to_string()))?;

    let mut parts = rest.split('/');
    let owner = parts.next().unwrap_or_default();
    let repo = parts.next().unwrap_or_default();
    let pull = parts.next().unwrap_or_default();
    let number = parts.next().unwrap_or_default();

    if owner.is_empty() || repo.is_empty() || pull != "pull" {
        return Err(GithubError::InvalidUrl(url.to_string()));
    }

    let number: u64 = number
        .parse()
        .map_err(|_| GithubError::InvalidUrl(url.to_string()))?;

    Ok((owner.to_string(), repo.to_string(), number))
}

/// Parse an `OWNER/REPO` slug.
pub fn parse_owner_repo(slug: &str) -> GithubResult<(String, String)> {
    let mut parts = slug.trim().trim_matches('/').split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GithubError::InvalidUrl(slug.to_string())),
    }
}
