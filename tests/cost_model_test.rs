//! End-to-end scenarios for the cost model
//!
//! Each test drives the public API with a fixed injected clock, so every
//! number asserted here is fully reproducible. Money comparisons use a
//! one-cent epsilon, hour comparisons 0.1 h unless the scenario pins an
//! exact intermediate value.

use chrono::{DateTime, TimeZone, Utc};
use prcost::config::CostConfig;
use prcost::cost::{aggregate_sessions, calculate, estimate_effort_hours, extrapolate, sample};
use prcost::models::{
    Breakdown, EventKind, ParticipantEvent, PrData, PrState, PrSummary,
};

const MONEY_EPS: f64 = 0.01;
const HOURS_EPS: f64 = 0.1;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

fn minutes(m: i64) -> chrono::Duration {
    chrono::Duration::minutes(m)
}

fn event(offset_min: i64, actor: &str, kind: EventKind) -> ParticipantEvent {
    ParticipantEvent::new(t0() + minutes(offset_min), actor, kind)
}

fn pr(
    lines_added: u64,
    lines_modified: u64,
    closed_at: Option<DateTime<Utc>>,
    events: Vec<ParticipantEvent>,
) -> PrData {
    PrData {
        url: "https://github.com/acme/widget/pull/1".into(),
        title: "Test PR".into(),
        author: "alice".into(),
        author_is_bot: false,
        created_at: t0(),
        closed_at,
        lines_added,
        lines_modified,
        events,
    }
}

/// The §8-style consistency sweep applied to every breakdown we compute.
fn assert_invariants(b: &Breakdown) {
    let participant_total: f64 = b.participants.iter().map(|p| p.total_cost).sum();
    assert!(
        (b.total_cost - (b.author.total_cost + b.delay.total_cost + participant_total)).abs()
            < MONEY_EPS,
        "total_cost must be the sum of its parts"
    );
    for (hours, cost) in [
        (b.author.total_hours, b.author.total_cost),
        (b.delay.total_hours, b.delay.total_cost),
        (b.total_hours, b.total_cost),
    ] {
        assert!(
            (hours * b.hourly_rate - cost).abs() < MONEY_EPS,
            "hours x rate must equal cost"
        );
    }
    if b.delay.delay_capped {
        let cap = b.config.max_project_delay_hours()
            * (b.config.delivery_delay_factor + b.config.coordination_factor);
        assert!(
            b.delay.delivery_delay_hours + b.delay.coordination_hours <= cap + 1e-9,
            "capped delay must respect the project ceiling"
        );
    }
    if b.pr_duration_hours < 0.5 {
        assert_eq!(b.delay.total_cost, 0.0);
    }
}

#[test]
fn scenario_single_commit_hour_old_pr() {
    // Single commit, 10 LOC, 1-hour-old PR.
    let config = CostConfig::default();
    let data = pr(10, 0, None, vec![event(0, "alice", EventKind::Commit)]);
    let b = calculate(&data, &config, t0() + minutes(60));

    assert_eq!(b.author.sessions, 1);
    assert!((b.author.github_hours - 0.1667).abs() < 0.001);
    assert!((b.author.github_context_hours - 0.6667).abs() < 0.001);
    assert!(b.delay.total_cost > 0.0);
    assert!(!b.delay.delay_capped);
    // An hour of delay at the default factors stays small.
    assert!(b.delay.delivery_delay_hours < 1.0);
    assert_invariants(&b);
}

#[test]
fn scenario_three_events_one_session() {
    let config = CostConfig::default();
    let events = vec![
        event(0, "alice", EventKind::Commit),
        event(5, "alice", EventKind::Comment),
        event(10, "alice", EventKind::Commit),
    ];
    let stats = aggregate_sessions(&events, &config);
    assert_eq!(stats.sessions, 1);
    assert!((stats.github_hours - 0.5).abs() < 1e-9);
    assert!((stats.context_hours - 40.0 / 60.0).abs() < 1e-9);
}

#[test]
fn scenario_two_events_ninety_minutes_apart() {
    let config = CostConfig::default();
    let events = vec![
        event(0, "alice", EventKind::Commit),
        event(90, "alice", EventKind::Comment),
    ];
    let stats = aggregate_sessions(&events, &config);
    assert_eq!(stats.sessions, 2);
    // 20 (in) + min(40, 90) + 20 (out) = 80 minutes.
    assert!((stats.context_hours - 80.0 / 60.0).abs() < 1e-9);
}

#[test]
fn scenario_week_old_open_pr() {
    let config = CostConfig::default();
    let data = pr(100, 0, None, vec![event(0, "alice", EventKind::Commit)]);
    let b = calculate(&data, &config, t0() + chrono::Duration::days(7));

    assert!((b.delay.delivery_delay_hours - 25.2).abs() < HOURS_EPS);
    assert!((b.delay.coordination_hours - 8.4).abs() < HOURS_EPS);
    assert!((b.delay.rework_percent - 4.0).abs() < 0.01);
    assert!((b.delay.code_churn_hours - estimate_effort_hours(4, &config)).abs() < 1e-9);
    assert!((b.delay.future_review_hours - 0.364).abs() < 0.001);
    assert!((b.delay.future_merge_hours - 0.167).abs() < 0.001);
    assert!((b.delay.future_context_hours - 1.333).abs() < 0.001);
    assert_invariants(&b);
}

#[test]
fn scenario_stale_pr_cap_applies_before_ceiling() {
    // 120 days open, last event at open: the 14-days-after-last-event rule
    // leaves 336 charged hours; the 90-day ceiling never engages.
    let config = CostConfig::default();
    let data = pr(100, 0, None, vec![event(0, "alice", EventKind::Commit)]);
    let b = calculate(&data, &config, t0() + chrono::Duration::days(120));

    assert!(b.delay.delay_capped);
    assert!((b.delay.delivery_delay_hours - 50.4).abs() < HOURS_EPS);
    assert_invariants(&b);
}

#[test]
fn scenario_closed_pr_has_no_future_costs() {
    let config = CostConfig::default();
    let closed = Some(t0() + chrono::Duration::days(3));
    let data = pr(200, 40, closed, vec![event(0, "alice", EventKind::Commit)]);
    let b = calculate(&data, &config, t0() + chrono::Duration::days(30));

    assert_eq!(b.delay.code_churn_cost, 0.0);
    assert_eq!(b.delay.future_review_cost, 0.0);
    assert_eq!(b.delay.future_merge_cost, 0.0);
    assert_eq!(b.delay.future_context_cost, 0.0);
    assert_invariants(&b);
}

#[test]
fn scenario_fast_turnaround_is_free_of_delay() {
    let config = CostConfig::default();
    let closed = Some(t0() + minutes(25));
    let data = pr(400, 0, closed, vec![event(0, "alice", EventKind::Commit)]);
    let b = calculate(&data, &config, t0() + chrono::Duration::days(1));
    assert_eq!(b.delay.total_cost, 0.0);
    assert_invariants(&b);
}

#[test]
fn scenario_sampler_buckets_spread() {
    // 100 PRs over 30 days, desired 10: ten picks in ten distinct 3-day
    // buckets.
    let prs: Vec<PrSummary> = (0..100u64)
        .map(|i| PrSummary {
            owner: "acme".into(),
            repo: "widget".into(),
            number: i,
            author: "alice".into(),
            updated_at: t0() + chrono::Duration::hours((i * 30 * 24 / 100) as i64),
            state: PrState::Closed,
            merged: true,
        })
        .collect();

    let picked = sample(&prs, 10);
    assert_eq!(picked.len(), 10);

    let newest = picked[0].updated_at;
    let bucket_width_seconds = 30.0 * 86_400.0 / 10.0;
    let mut buckets = std::collections::BTreeSet::new();
    for p in &picked {
        let age = (newest - p.updated_at).num_seconds() as f64;
        let bucket = ((age / bucket_width_seconds) as usize).min(9);
        assert!(buckets.insert(bucket), "two picks in bucket {bucket}");
    }
}

#[test]
fn scenario_extrapolation_scales_sample_average() {
    // Five samples averaging ~$1,000 against a population of 100.
    let config = CostConfig::default();
    let now = t0() + chrono::Duration::days(1);

    let breakdowns: Vec<Breakdown> = (0..5)
        .map(|i| {
            let mut data = pr(
                300,
                0,
                Some(t0() + chrono::Duration::hours(20)),
                vec![event(0, "alice", EventKind::Commit)],
            );
            data.author = format!("dev{i}");
            calculate(&data, &config, now)
        })
        .collect();

    let per_sample = breakdowns[0].total_cost;
    let out = extrapolate(&breakdowns, 100, 5, 0, 5, 30.0, &config);
    assert!((out.total_cost - per_sample * 100.0).abs() < 1.0);
    assert_eq!(out.successful_samples, 5);
    assert_eq!(out.unique_authors, 5);
}

#[test]
fn calculation_is_reproducible() {
    let config = CostConfig::default();
    let now = t0() + chrono::Duration::days(11);
    let events = vec![
        event(0, "alice", EventKind::Commit),
        event(45, "bob", EventKind::Review),
        event(200, "bob", EventKind::ReviewComment),
        event(210, "carol", EventKind::Comment),
        event(400, "alice", EventKind::Commit),
    ];
    let data = pr(850, 120, None, events);

    let first = calculate(&data, &config, now);
    let second = calculate(&data, &config, now);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_invariants(&first);

    // Participant ordering is part of the contract.
    let actors: Vec<&str> = first.participants.iter().map(|p| p.actor.as_str()).collect();
    assert_eq!(actors.len(), 2);
    assert!(first.participants[0].total_cost >= first.participants[1].total_cost);
}

#[test]
fn effort_estimator_properties() {
    let config = CostConfig::default();
    assert_eq!(estimate_effort_hours(0, &config), 0.0);
    for lines in 1..200u64 {
        assert!(estimate_effort_hours(lines, &config) >= config.min_effort_hours());
        assert!(
            estimate_effort_hours(lines + 1, &config) >= estimate_effort_hours(lines, &config)
        );
    }
}
