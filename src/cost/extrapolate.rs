//! Sample-to-population extrapolation
//!
//! Projects a handful of per-PR breakdowns onto the whole population by
//! scaling sample sums with the population/sample ratio, then derives the
//! waste metrics reporting cares about: preventable cost, weekly waste per
//! author, annualized waste and its headcount equivalent, efficiency, and
//! the savings available from hitting a fast-turnaround target.
//!
//! Bot-authored PRs get the zero-cost treatment here: their author and
//! participant costs are dropped, their delay cost is reclassified as
//! automated-update waste, and their LOC are surfaced separately so the
//! human numbers stay honest.

use std::collections::BTreeSet;

use crate::config::CostConfig;
use crate::cost::grading::{efficiency_grade, velocity_grade};
use crate::models::{Breakdown, ExtrapolatedBreakdown};

/// Project sample breakdowns to population totals.
///
/// `total_prs` is the population size, `total_authors` the canonical
/// population author count, `open_prs` the *actual* (not extrapolated)
/// open-PR count, `sampled_prs` how many samples were attempted, and
/// `actual_days` the effective analysis window. All outputs are
/// deterministic and independent of input ordering.
pub fn extrapolate(
    breakdowns: &[Breakdown],
    total_prs: u64,
    total_authors: u64,
    open_prs: u64,
    sampled_prs: usize,
    actual_days: f64,
    config: &CostConfig,
) -> ExtrapolatedBreakdown {
    let successful = breakdowns.len();
    let mut out = ExtrapolatedBreakdown {
        total_prs,
        sampled_prs,
        successful_samples: successful,
        total_authors,
        open_prs,
        actual_days,
        ..ExtrapolatedBreakdown::default()
    };

    if successful == 0 {
        out.efficiency_percent = 100.0;
        out.efficiency_grade = efficiency_grade(100.0);
        out.velocity_grade = velocity_grade(0.0);
        return out;
    }

    let mut authors: BTreeSet<&str> = BTreeSet::new();
    let mut all_duration = 0.0;
    let mut human_duration = 0.0;
    let mut bot_duration = 0.0;

    for b in breakdowns {
        all_duration += b.pr_duration_hours;

        if b.author_is_bot {
            out.bot_prs += 1;
            out.bot_lines_added += b.lines_added;
            out.bot_lines_modified += b.lines_modified;
            bot_duration += b.pr_duration_hours;

            // Bot PR cost is zeroed; the delay of leaving automated PRs
            // open is real waste and lands in its own bucket.
            out.automated_updates_cost += b.delay.delivery_delay_cost
                + b.delay.coordination_cost
                + b.delay.code_churn_cost;
            out.automated_updates_hours += b.delay.delivery_delay_hours
                + b.delay.coordination_hours
                + b.delay.code_churn_hours;
            continue;
        }

        out.human_prs += 1;
        out.human_lines_added += b.lines_added;
        out.human_lines_modified += b.lines_modified;
        human_duration += b.pr_duration_hours;
        authors.insert(b.author.author.as_str());

        out.new_code_cost += b.author.new_code_cost;
        out.new_code_hours += b.author.new_code_hours;
        out.adaptation_cost += b.author.adaptation_cost;
        out.adaptation_hours += b.author.adaptation_hours;
        out.author_github_cost += b.author.github_cost;
        out.author_github_hours += b.author.github_hours;
        out.author_context_cost += b.author.github_context_cost;
        out.author_context_hours += b.author.github_context_hours;

        for p in &b.participants {
            out.review_cost += p.review_cost;
            out.review_hours += p.review_hours;
            out.participant_github_cost += p.github_cost;
            out.participant_github_hours += p.github_hours;
            out.participant_context_cost += p.github_context_cost;
            out.participant_context_hours += p.github_context_hours;
        }

        out.delivery_delay_cost += b.delay.delivery_delay_cost;
        out.delivery_delay_hours += b.delay.delivery_delay_hours;
        out.coordination_cost += b.delay.coordination_cost;
        out.coordination_hours += b.delay.coordination_hours;
        out.code_churn_cost += b.delay.code_churn_cost;
        out.code_churn_hours += b.delay.code_churn_hours;
        out.future_review_cost += b.delay.future_review_cost;
        out.future_review_hours += b.delay.future_review_hours;
        out.future_merge_cost += b.delay.future_merge_cost;
        out.future_merge_hours += b.delay.future_merge_hours;
        out.future_context_cost += b.delay.future_context_cost;
        out.future_context_hours += b.delay.future_context_hours;
    }

    out.unique_authors = authors.len();
    out.avg_open_hours = all_duration / successful as f64;
    out.avg_human_open_hours = if out.human_prs > 0 {
        human_duration / out.human_prs as f64
    } else {
        0.0
    };
    out.avg_bot_open_hours = if out.bot_prs > 0 {
        bot_duration / out.bot_prs as f64
    } else {
        0.0
    };

    // Population extrapolation: every accumulated money/hour field scales
    // by population / sample.
    let scale = total_prs as f64 / successful as f64;
    for field in [
        &mut out.new_code_cost,
        &mut out.new_code_hours,
        &mut out.adaptation_cost,
        &mut out.adaptation_hours,
        &mut out.author_github_cost,
        &mut out.author_github_hours,
        &mut out.author_context_cost,
        &mut out.author_context_hours,
        &mut out.review_cost,
        &mut out.review_hours,
        &mut out.participant_github_cost,
        &mut out.participant_github_hours,
        &mut out.participant_context_cost,
        &mut out.participant_context_hours,
        &mut out.delivery_delay_cost,
        &mut out.delivery_delay_hours,
        &mut out.coordination_cost,
        &mut out.coordination_hours,
        &mut out.code_churn_cost,
        &mut out.code_churn_hours,
        &mut out.future_review_cost,
        &mut out.future_review_hours,
        &mut out.future_merge_cost,
        &mut out.future_merge_hours,
        &mut out.future_context_cost,
        &mut out.future_context_hours,
        &mut out.automated_updates_cost,
        &mut out.automated_updates_hours,
    ] {
        *field *= scale;
    }

    // Open-PR tracking uses the actual open count, not an extrapolation.
    // When bot tracking is off, approximate the bot share of open PRs with
    // the sample's bot fraction.
    let weeks = (actual_days / 7.0).max(0.0);
    let tracked_prs = if config.track_bot_prs {
        open_prs as f64
    } else {
        open_prs as f64 * out.human_prs as f64 / successful as f64
    };
    out.pr_tracking_hours = tracked_prs * config.pr_tracking_hours_per_week() * weeks;
    out.pr_tracking_cost = out.pr_tracking_hours * config.hourly_rate();

    out.total_cost = out.new_code_cost
        + out.adaptation_cost
        + out.author_github_cost
        + out.author_context_cost
        + out.review_cost
        + out.participant_github_cost
        + out.participant_context_cost
        + out.delivery_delay_cost
        + out.coordination_cost
        + out.code_churn_cost
        + out.future_review_cost
        + out.future_merge_cost
        + out.future_context_cost
        + out.automated_updates_cost
        + out.pr_tracking_cost;
    out.total_hours = out.new_code_hours
        + out.adaptation_hours
        + out.author_github_hours
        + out.author_context_hours
        + out.review_hours
        + out.participant_github_hours
        + out.participant_context_hours
        + out.delivery_delay_hours
        + out.coordination_hours
        + out.code_churn_hours
        + out.future_review_hours
        + out.future_merge_hours
        + out.future_context_hours
        + out.automated_updates_hours
        + out.pr_tracking_hours;

    // Preventable loss: everything a faster merge pipeline would avoid.
    out.preventable_cost = out.code_churn_cost
        + out.delivery_delay_cost
        + out.coordination_cost
        + out.automated_updates_cost
        + out.pr_tracking_cost;
    out.preventable_hours = out.code_churn_hours
        + out.delivery_delay_hours
        + out.coordination_hours
        + out.automated_updates_hours
        + out.pr_tracking_hours;

    out.waste_per_week = if weeks > 0.0 {
        out.preventable_cost / weeks
    } else {
        0.0
    };
    let author_divisor = if total_authors > 0 {
        total_authors as f64
    } else {
        out.unique_authors.max(1) as f64
    };
    out.waste_per_author_per_week = out.waste_per_week / author_divisor;

    out.annual_waste = if actual_days > 0.0 {
        out.preventable_cost * 365.0 / actual_days
    } else {
        0.0
    };
    out.headcount_equivalent =
        out.annual_waste / (config.annual_salary * config.benefits_multiplier);

    out.efficiency_percent = if out.total_hours > 0.0 {
        (100.0 * (out.total_hours - out.preventable_hours) / out.total_hours).clamp(0.0, 100.0)
    } else {
        100.0
    };

    // Savings available from merging at the target pace: delay-shaped
    // waste scales roughly linearly with open duration.
    out.r2r_savings = if out.avg_open_hours > config.r2r_target_hours {
        out.preventable_cost * (1.0 - config.r2r_target_hours / out.avg_open_hours)
    } else {
        0.0
    };

    out.efficiency_grade = efficiency_grade(out.efficiency_percent);
    out.velocity_grade = velocity_grade(out.avg_open_hours);

    out
}
