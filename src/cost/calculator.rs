//! Per-PR cost calculation
//!
//! Applies the cost model to one PR's timeline and diff, emitting a fully
//! itemized [`Breakdown`]: author cost (writing + interacting), per
//! participant cost (reviewing + interacting), and delay cost (opportunity,
//! coordination, code drift, and the unrealized completion costs of open
//! PRs). The calculator never fails; malformed inputs are clamped.
//!
//! `now` is an explicit argument so analyses are reproducible: inject a
//! fixed clock and the same inputs always produce the same breakdown.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::CostConfig;
use crate::cost::effort::estimate_effort_hours;
use crate::cost::sessions::aggregate_sessions;
use crate::models::{
    AuthorCostDetail, Breakdown, DelayCostDetail, EventKind, ParticipantCostDetail,
    ParticipantEvent, PrData,
};

/// PRs turned around faster than this accrue no delay cost at all.
const FAST_TURNAROUND_HOURS: f64 = 0.5;

/// Weekly code-retention constant of the churn model: each week a PR sits
/// unmerged, ~4% of its diff is expected to need rework.
const WEEKLY_RETENTION: f64 = 0.96;

/// Days of drift below which churn is not charged.
const MIN_DRIFT_DAYS: f64 = 3.0;

/// Compute the itemized cost breakdown for a single PR.
pub fn calculate(pr: &PrData, config: &CostConfig, now: DateTime<Utc>) -> Breakdown {
    let hourly_rate = config.hourly_rate();

    let author = author_costs(pr, config, hourly_rate);
    let participants = participant_costs(pr, config, hourly_rate);
    let delay = delay_costs(pr, config, hourly_rate, now);

    let participant_cost: f64 = participants.iter().map(|p| p.total_cost).sum();
    let participant_hours: f64 = participants.iter().map(|p| p.total_hours).sum();

    Breakdown {
        url: pr.url.clone(),
        title: pr.title.clone(),
        author_is_bot: pr.author_is_bot,
        lines_added: pr.lines_added,
        lines_modified: pr.lines_modified,
        pr_duration_hours: pr.duration_hours(now),
        total_cost: author.total_cost + delay.total_cost + participant_cost,
        total_hours: author.total_hours + delay.total_hours + participant_hours,
        author,
        participants,
        delay,
        hourly_rate,
        config: config.clone(),
    }
}

/// Author-side costs: writing the diff plus interacting with the PR.
///
/// Commits are always author events regardless of actor (pushes to the PR
/// branch belong to the PR), joined by the author's own non-commit events.
fn author_costs(pr: &PrData, config: &CostConfig, hourly_rate: f64) -> AuthorCostDetail {
    let author_events: Vec<ParticipantEvent> = pr
        .events
        .iter()
        .filter(|e| e.kind == EventKind::Commit || e.actor == pr.author)
        .cloned()
        .collect();

    let new_code_hours = estimate_effort_hours(pr.lines_added, config);
    let adaptation_hours =
        estimate_effort_hours(pr.lines_modified, config) * config.modification_cost_factor;
    let stats = aggregate_sessions(&author_events, config);

    let total_hours = new_code_hours + adaptation_hours + stats.github_hours + stats.context_hours;

    AuthorCostDetail {
        author: pr.author.clone(),
        new_code_cost: new_code_hours * hourly_rate,
        new_code_hours,
        adaptation_cost: adaptation_hours * hourly_rate,
        adaptation_hours,
        github_cost: stats.github_hours * hourly_rate,
        github_hours: stats.github_hours,
        github_context_cost: stats.context_hours * hourly_rate,
        github_context_hours: stats.context_hours,
        events: author_events.len(),
        sessions: stats.sessions,
        total_cost: total_hours * hourly_rate,
        total_hours,
    }
}

/// Per-participant costs for everyone who engaged with the PR besides the
/// author. Commit events are excluded here (they belong to the author).
///
/// Grouping uses a `BTreeMap` and the result is sorted by total cost
/// descending (ties by actor name) so output is reproducible regardless of
/// map iteration order.
fn participant_costs(
    pr: &PrData,
    config: &CostConfig,
    hourly_rate: f64,
) -> Vec<ParticipantCostDetail> {
    let mut by_actor: BTreeMap<&str, Vec<ParticipantEvent>> = BTreeMap::new();
    for event in &pr.events {
        if event.kind == EventKind::Commit || event.actor == pr.author {
            continue;
        }
        by_actor
            .entry(event.actor.as_str())
            .or_default()
            .push(event.clone());
    }

    let review_hours = pr.lines_added as f64 / effective_inspection_rate(config);

    let mut details: Vec<ParticipantCostDetail> = by_actor
        .into_iter()
        .map(|(actor, events)| {
            let stats = aggregate_sessions(&events, config);
            let total_hours = review_hours + stats.github_hours + stats.context_hours;
            ParticipantCostDetail {
                actor: actor.to_string(),
                review_cost: review_hours * hourly_rate,
                review_hours,
                github_cost: stats.github_hours * hourly_rate,
                github_hours: stats.github_hours,
                github_context_cost: stats.context_hours * hourly_rate,
                github_context_hours: stats.context_hours,
                events: events.len(),
                sessions: stats.sessions,
                total_cost: total_hours * hourly_rate,
                total_hours,
            }
        })
        .collect();

    details.sort_by(|a, b| {
        b.total_cost
            .partial_cmp(&a.total_cost)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.actor.cmp(&b.actor))
    });

    details
}

/// Reviewer inspection rate with a guard against a non-positive setting.
fn effective_inspection_rate(config: &CostConfig) -> f64 {
    if config.review_inspection_rate > 0.0 {
        config.review_inspection_rate
    } else {
        275.0
    }
}

/// Delay costs: opportunity + coordination on the capped open time, code
/// drift for stale open PRs, and the unrealized completion costs of open
/// PRs. Fast-turnaround PRs (under 30 minutes) accrue nothing.
fn delay_costs(
    pr: &PrData,
    config: &CostConfig,
    hourly_rate: f64,
    now: DateTime<Utc>,
) -> DelayCostDetail {
    let pr_hours = pr.duration_hours(now);
    if pr_hours < FAST_TURNAROUND_HOURS {
        return DelayCostDetail::default();
    }

    let end_time = pr.end_time(now);
    let last_event_time = pr
        .events
        .iter()
        .map(|e| e.timestamp)
        .max()
        .unwrap_or(pr.created_at);
    let stale_hours = ((end_time - last_event_time).num_seconds() as f64 / 3600.0).max(0.0);

    // Stop the delay clock 14 days after the last sign of life, then apply
    // the absolute project-delay ceiling.
    let mut capped_hours = pr_hours;
    let mut delay_capped = false;

    let max_stale = config.max_delay_after_last_event_hours();
    if stale_hours > max_stale {
        capped_hours = (capped_hours - (stale_hours - max_stale)).max(0.0);
        delay_capped = true;
    }
    let max_project = config.max_project_delay_hours();
    if capped_hours > max_project {
        capped_hours = max_project;
        delay_capped = true;
    }

    let delivery_delay_hours = capped_hours * config.delivery_delay_factor;
    let coordination_hours = capped_hours * config.coordination_factor;

    let (code_churn_hours, rework_percent) = code_churn(pr, config, now);

    // Unrealized completion costs: a future review pass over the diff, one
    // merge interaction, and two complete context switches (reviewer and
    // author each swap out and back in).
    let (future_review_hours, future_merge_hours, future_context_hours) = if pr.is_open() {
        (
            pr.lines_added as f64 / effective_inspection_rate(config),
            config.event_duration_hours(),
            2.0 * (2.0 * config.context_switch_hours()),
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    let total_hours = delivery_delay_hours
        + coordination_hours
        + code_churn_hours
        + future_review_hours
        + future_merge_hours
        + future_context_hours;

    DelayCostDetail {
        delivery_delay_cost: delivery_delay_hours * hourly_rate,
        delivery_delay_hours,
        coordination_cost: coordination_hours * hourly_rate,
        coordination_hours,
        code_churn_cost: code_churn_hours * hourly_rate,
        code_churn_hours,
        future_review_cost: future_review_hours * hourly_rate,
        future_review_hours,
        future_merge_cost: future_merge_hours * hourly_rate,
        future_merge_hours,
        future_context_cost: future_context_hours * hourly_rate,
        future_context_hours,
        rework_percent,
        delay_capped,
        total_cost: total_hours * hourly_rate,
        total_hours,
    }
}

/// Probability-based weekly churn: the longer an open PR drifts behind its
/// base branch, the more of its diff is expected to need rework. Only open
/// PRs with at least one commit accrue churn.
///
/// Returns (hours, displayed rework percent). The percentage is recomputed
/// from the floored LOC count so the report matches the charged amount.
fn code_churn(pr: &PrData, config: &CostConfig, now: DateTime<Utc>) -> (f64, f64) {
    if !pr.is_open() {
        return (0.0, 0.0);
    }
    let Some(last_commit) = pr
        .events
        .iter()
        .filter(|e| e.kind == EventKind::Commit)
        .map(|e| e.timestamp)
        .max()
    else {
        return (0.0, 0.0);
    };

    let drift_days = ((now - last_commit).num_seconds() as f64 / 86_400.0)
        .clamp(0.0, config.max_code_drift_days);
    if drift_days < MIN_DRIFT_DAYS {
        return (0.0, 0.0);
    }

    let rework_fraction = 1.0 - WEEKLY_RETENTION.powf(drift_days / 7.0);
    let mut rework_loc = (pr.lines_added as f64 * rework_fraction).floor() as u64;
    if pr.lines_added > 0 && rework_loc == 0 {
        rework_loc = 1;
    }

    let hours = estimate_effort_hours(rework_loc, config);
    let percent = if pr.lines_added > 0 {
        100.0 * rework_loc as f64 / pr.lines_added as f64
    } else {
        0.0
    };
    (hours, percent)
}
