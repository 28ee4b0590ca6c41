//! Core data models for prcost
//!
//! These models are used throughout the codebase for representing PR
//! timelines, per-PR cost breakdowns, and extrapolated population-level
//! estimates. Everything here is plain data: producers build a value, hand
//! it off, and nobody mutates it afterwards. The object graph is a tree
//! (config -> breakdown -> sub-details), which keeps serialization and
//! cross-thread hand-off trivial.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CostConfig;

/// Kind of a discrete action on a PR timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A commit pushed to the PR branch. Commits are always attributed to
    /// the PR author, regardless of who pushed them.
    Commit,
    /// A submitted review (approve / request-changes / comment review).
    Review,
    /// An issue-style comment on the PR conversation.
    Comment,
    /// An inline comment on the diff.
    ReviewComment,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Commit => write!(f, "commit"),
            EventKind::Review => write!(f, "review"),
            EventKind::Comment => write!(f, "comment"),
            EventKind::ReviewComment => write!(f, "review_comment"),
        }
    }
}

/// A discrete action on the PR timeline with an actor and a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantEvent {
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub kind: EventKind,
}

impl ParticipantEvent {
    pub fn new(timestamp: DateTime<Utc>, actor: impl Into<String>, kind: EventKind) -> Self {
        Self {
            timestamp,
            actor: actor.into(),
            kind,
        }
    }
}

/// Whether a PR is still open or has been closed (merged or not).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
}

/// Lightweight PR summary used for sampling.
///
/// Summaries are what the list endpoints return; the full timeline is only
/// fetched for PRs that survive sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrSummary {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub author: String,
    pub updated_at: DateTime<Utc>,
    pub state: PrState,
    pub merged: bool,
}

impl PrSummary {
    /// Canonical web URL for this PR.
    pub fn url(&self) -> String {
        format!(
            "https://github.com/{}/{}/pull/{}",
            self.owner, self.repo, self.number
        )
    }
}

/// Raw data for a single PR, as produced by the fetcher.
///
/// Bot events have already been removed from `events`; `author_is_bot`
/// records whether the PR itself was opened by an automation account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrData {
    pub url: String,
    pub title: String,
    pub author: String,
    pub author_is_bot: bool,
    pub created_at: DateTime<Utc>,
    /// Unset while the PR is still open.
    pub closed_at: Option<DateTime<Utc>>,
    pub lines_added: u64,
    pub lines_modified: u64,
    /// Timeline events, not necessarily sorted. The session aggregator
    /// sorts before analysis.
    pub events: Vec<ParticipantEvent>,
}

impl PrData {
    /// The end of the PR's measured life: `closed_at` if set, else `now`.
    pub fn end_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.closed_at.unwrap_or(now)
    }

    /// Elapsed open time in hours, clamped to zero for malformed inputs.
    pub fn duration_hours(&self, now: DateTime<Utc>) -> f64 {
        let seconds = (self.end_time(now) - self.created_at).num_seconds();
        (seconds as f64 / 3600.0).max(0.0)
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}

/// Itemized author-side costs for one PR.
///
/// Invariant: `total_cost` is the sum of the component costs and every
/// component satisfies `hours * hourly_rate == cost`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorCostDetail {
    pub author: String,
    /// Writing the new code (size -> effort curve on `lines_added`).
    pub new_code_cost: f64,
    pub new_code_hours: f64,
    /// Adapting existing code (`lines_modified`, discounted).
    pub adaptation_cost: f64,
    pub adaptation_hours: f64,
    /// Time attributed to interacting with the PR itself.
    pub github_cost: f64,
    pub github_hours: f64,
    /// Context-switch overhead around those interactions.
    pub github_context_cost: f64,
    pub github_context_hours: f64,
    pub events: usize,
    pub sessions: usize,
    pub total_cost: f64,
    pub total_hours: f64,
}

/// Itemized costs for one non-author participant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticipantCostDetail {
    pub actor: String,
    /// LOC-based review estimate (`lines_added` / inspection rate). This
    /// replaces any ad-hoc notion of review time; the event-based hours
    /// below only cover GitHub interaction.
    pub review_cost: f64,
    pub review_hours: f64,
    pub github_cost: f64,
    pub github_hours: f64,
    pub github_context_cost: f64,
    pub github_context_hours: f64,
    pub events: usize,
    pub sessions: usize,
    pub total_cost: f64,
    pub total_hours: f64,
}

/// Itemized delay costs for one PR.
///
/// Future-* components are the unrealized costs of getting an open PR over
/// the line; they are zero for closed PRs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelayCostDetail {
    /// Opportunity cost of value not being delivered while the PR is open.
    pub delivery_delay_cost: f64,
    pub delivery_delay_hours: f64,
    /// Mental overhead of tracking an unmerged PR.
    pub coordination_cost: f64,
    pub coordination_hours: f64,
    /// Probability-weighted rework expected because the codebase drifts
    /// while the PR sits unmerged.
    pub code_churn_cost: f64,
    pub code_churn_hours: f64,
    pub future_review_cost: f64,
    pub future_review_hours: f64,
    pub future_merge_cost: f64,
    pub future_merge_hours: f64,
    pub future_context_cost: f64,
    pub future_context_hours: f64,
    /// Share of `lines_added` projected to need rework, in percent, as
    /// displayed (recomputed from the floored LOC count).
    pub rework_percent: f64,
    /// True when the stale-PR or absolute caps reduced the charged delay.
    pub delay_capped: bool,
    pub total_cost: f64,
    pub total_hours: f64,
}

/// Fully itemized cost breakdown for a single PR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breakdown {
    pub url: String,
    pub title: String,
    pub author_is_bot: bool,
    pub lines_added: u64,
    pub lines_modified: u64,
    /// Elapsed open time at analysis, in hours.
    pub pr_duration_hours: f64,
    pub author: AuthorCostDetail,
    /// Sorted by total cost descending (ties by actor name) so output is
    /// reproducible regardless of map iteration order.
    pub participants: Vec<ParticipantCostDetail>,
    pub delay: DelayCostDetail,
    pub hourly_rate: f64,
    /// The configuration this breakdown was computed under.
    pub config: CostConfig,
    pub total_cost: f64,
    pub total_hours: f64,
}

impl Breakdown {
    /// Sum of all participant totals.
    pub fn participant_cost(&self) -> f64 {
        self.participants.iter().map(|p| p.total_cost).sum()
    }

    pub fn participant_hours(&self) -> f64 {
        self.participants.iter().map(|p| p.total_hours).sum()
    }
}

/// A letter grade with its human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub letter: String,
    pub message: String,
}

impl Grade {
    pub fn new(letter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            letter: letter.into(),
            message: message.into(),
        }
    }
}

impl Default for Grade {
    fn default() -> Self {
        Grade::new("F", "Failing")
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.letter, self.message)
    }
}

/// Population-level estimate projected from a sample of breakdowns.
///
/// Monetary and hour fields are extrapolated (sample sum scaled by
/// population/sample); counts and LOC aggregates are raw sample values
/// unless noted. Bot PRs contribute no author/participant cost; their delay
/// cost is reclassified as `automated_updates_*` and their LOC are surfaced
/// separately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtrapolatedBreakdown {
    // Sample metadata.
    pub total_prs: u64,
    pub sampled_prs: usize,
    pub successful_samples: usize,

    // Author-side aggregates (human PRs, extrapolated).
    pub new_code_cost: f64,
    pub new_code_hours: f64,
    pub adaptation_cost: f64,
    pub adaptation_hours: f64,
    pub author_github_cost: f64,
    pub author_github_hours: f64,
    pub author_context_cost: f64,
    pub author_context_hours: f64,

    // Participant-side aggregates (human PRs, extrapolated).
    pub review_cost: f64,
    pub review_hours: f64,
    pub participant_github_cost: f64,
    pub participant_github_hours: f64,
    pub participant_context_cost: f64,
    pub participant_context_hours: f64,

    // Delay aggregates (human PRs, extrapolated).
    pub delivery_delay_cost: f64,
    pub delivery_delay_hours: f64,
    pub coordination_cost: f64,
    pub coordination_hours: f64,
    pub code_churn_cost: f64,
    pub code_churn_hours: f64,
    pub future_review_cost: f64,
    pub future_review_hours: f64,
    pub future_merge_cost: f64,
    pub future_merge_hours: f64,
    pub future_context_cost: f64,
    pub future_context_hours: f64,

    // Bot PR delay, reclassified (extrapolated).
    pub automated_updates_cost: f64,
    pub automated_updates_hours: f64,

    // Open-PR tracking. `open_prs` is the actual count supplied by the
    // orchestrator, not an extrapolation.
    pub open_prs: u64,
    pub pr_tracking_cost: f64,
    pub pr_tracking_hours: f64,

    pub total_cost: f64,
    pub total_hours: f64,

    // Human vs bot split (raw sample values).
    pub human_prs: usize,
    pub bot_prs: usize,
    pub human_lines_added: u64,
    pub human_lines_modified: u64,
    pub bot_lines_added: u64,
    pub bot_lines_modified: u64,

    // Average open durations in hours (raw sample values).
    pub avg_open_hours: f64,
    pub avg_human_open_hours: f64,
    pub avg_bot_open_hours: f64,

    /// Distinct non-bot author logins observed in the sample.
    pub unique_authors: usize,
    /// Canonical population author count supplied by the caller.
    pub total_authors: u64,

    /// Effective analysis window in days.
    pub actual_days: f64,

    // Waste metrics.
    pub preventable_cost: f64,
    pub preventable_hours: f64,
    pub waste_per_week: f64,
    pub waste_per_author_per_week: f64,
    pub annual_waste: f64,
    /// Annualized waste expressed in fully loaded engineer salaries.
    pub headcount_equivalent: f64,
    /// Preventable cost that would disappear if the average open duration
    /// dropped to the configured target.
    pub r2r_savings: f64,

    // Grades.
    pub efficiency_percent: f64,
    pub efficiency_grade: Grade,
    pub velocity_grade: Grade,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pr(created: DateTime<Utc>, closed: Option<DateTime<Utc>>) -> PrData {
        PrData {
            url: String::new(),
            title: String::new(),
            author: "alice".into(),
            author_is_bot: false,
            created_at: created,
            closed_at: closed,
            lines_added: 0,
            lines_modified: 0,
            events: Vec::new(),
        }
    }

    #[test]
    fn duration_clamps_negative_to_zero() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let p = pr(created, Some(created - chrono::Duration::hours(2)));
        assert_eq!(p.duration_hours(created), 0.0);
    }

    #[test]
    fn open_pr_duration_uses_now() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let now = created + chrono::Duration::hours(36);
        let p = pr(created, None);
        assert!(p.is_open());
        assert!((p.duration_hours(now) - 36.0).abs() < 1e-9);
    }

    #[test]
    fn summary_url_is_canonical() {
        let s = PrSummary {
            owner: "acme".into(),
            repo: "widget".into(),
            number: 42,
            author: "alice".into(),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            state: PrState::Open,
            merged: false,
        };
        assert_eq!(s.url(), "https://github.com/acme/widget/pull/42");
    }
}
