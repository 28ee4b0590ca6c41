//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for PR comments, READMEs, and wikis.

use anyhow::Result;

use super::{hours_fmt, money};
use crate::models::Breakdown;
use crate::orchestrator::AnalysisReport;

fn row(out: &mut String, label: &str, hours: f64, cost: f64) {
    if hours == 0.0 && cost == 0.0 {
        return;
    }
    out.push_str(&format!(
        "| {label} | {} | {} |\n",
        hours_fmt(hours),
        money(cost)
    ));
}

const TABLE_HEADER: &str = "| Item | Hours | Cost |\n|---|---:|---:|\n";

pub fn render_breakdown(b: &Breakdown) -> Result<String> {
    let mut md = String::new();

    md.push_str(&format!("## PR Cost: {}\n\n", money(b.total_cost)));
    if !b.title.is_empty() {
        md.push_str(&format!("**{}** — {}\n\n", b.title, b.url));
    } else {
        md.push_str(&format!("{}\n\n", b.url));
    }
    md.push_str(&format!(
        "Author **{}**{} · +{} / ~{} LOC · open {}\n\n",
        b.author.author,
        if b.author_is_bot { " (bot)" } else { "" },
        b.lines_added,
        b.lines_modified,
        hours_fmt(b.pr_duration_hours)
    ));

    md.push_str(TABLE_HEADER);
    row(&mut md, "Author: new code", b.author.new_code_hours, b.author.new_code_cost);
    row(
        &mut md,
        "Author: adaptation",
        b.author.adaptation_hours,
        b.author.adaptation_cost,
    );
    row(
        &mut md,
        "Author: GitHub activity",
        b.author.github_hours,
        b.author.github_cost,
    );
    row(
        &mut md,
        "Author: context switching",
        b.author.github_context_hours,
        b.author.github_context_cost,
    );
    for p in &b.participants {
        row(
            &mut md,
            &format!("{}: review + activity", p.actor),
            p.total_hours,
            p.total_cost,
        );
    }
    row(
        &mut md,
        "Delay: delivery",
        b.delay.delivery_delay_hours,
        b.delay.delivery_delay_cost,
    );
    row(
        &mut md,
        "Delay: coordination",
        b.delay.coordination_hours,
        b.delay.coordination_cost,
    );
    row(
        &mut md,
        "Delay: code churn",
        b.delay.code_churn_hours,
        b.delay.code_churn_cost,
    );
    row(
        &mut md,
        "Delay: future completion",
        b.delay.future_review_hours + b.delay.future_merge_hours + b.delay.future_context_hours,
        b.delay.future_review_cost + b.delay.future_merge_cost + b.delay.future_context_cost,
    );
    row(&mut md, "**Total**", b.total_hours, b.total_cost);

    if b.delay.delay_capped {
        md.push_str("\n_Delay cost capped (stale or long-lived PR)._\n");
    }

    Ok(md)
}

pub fn render_report(r: &AnalysisReport) -> Result<String> {
    let x = &r.breakdown;
    let mut md = String::new();

    md.push_str(&format!(
        "## {} — {} over {:.0} days\n\n",
        r.scope,
        money(x.total_cost),
        x.actual_days
    ));
    md.push_str(&format!(
        "{} PRs ({} analyzed), {} authors, {} open now. \
         Average open time {}.\n\n",
        x.total_prs,
        x.successful_samples,
        x.total_authors,
        x.open_prs,
        hours_fmt(x.avg_open_hours)
    ));

    md.push_str(TABLE_HEADER);
    row(
        &mut md,
        "Development",
        x.new_code_hours + x.adaptation_hours,
        x.new_code_cost + x.adaptation_cost,
    );
    row(&mut md, "Code review", x.review_hours, x.review_cost);
    row(
        &mut md,
        "GitHub activity",
        x.author_github_hours + x.participant_github_hours,
        x.author_github_cost + x.participant_github_cost,
    );
    row(
        &mut md,
        "Context switching",
        x.author_context_hours + x.participant_context_hours,
        x.author_context_cost + x.participant_context_cost,
    );
    row(
        &mut md,
        "Delivery delay",
        x.delivery_delay_hours,
        x.delivery_delay_cost,
    );
    row(&mut md, "Coordination", x.coordination_hours, x.coordination_cost);
    row(&mut md, "Code churn", x.code_churn_hours, x.code_churn_cost);
    row(
        &mut md,
        "Future completion",
        x.future_review_hours + x.future_merge_hours + x.future_context_hours,
        x.future_review_cost + x.future_merge_cost + x.future_context_cost,
    );
    row(
        &mut md,
        "Automated updates",
        x.automated_updates_hours,
        x.automated_updates_cost,
    );
    row(&mut md, "PR tracking", x.pr_tracking_hours, x.pr_tracking_cost);
    row(&mut md, "**Total**", x.total_hours, x.total_cost);

    md.push_str("\n### Waste\n\n");
    md.push_str(&format!(
        "- Preventable: **{}** ({})\n",
        money(x.preventable_cost),
        hours_fmt(x.preventable_hours)
    ));
    md.push_str(&format!(
        "- Per author per week: {}\n",
        money(x.waste_per_author_per_week)
    ));
    md.push_str(&format!(
        "- Annualized: {} (≈ {:.2} engineers)\n",
        money(x.annual_waste),
        x.headcount_equivalent
    ));
    if x.r2r_savings > 0.0 {
        md.push_str(&format!(
            "- Available by merging at the target pace: {}\n",
            money(x.r2r_savings)
        ));
    }

    md.push_str("\n### Grades\n\n");
    md.push_str(&format!(
        "| Efficiency | Velocity | Merge rate |\n|---|---|---|\n| {:.1}% — {} | {} | {:.0}% — {} |\n",
        x.efficiency_percent,
        x.efficiency_grade,
        x.velocity_grade,
        r.merge_rate * 100.0,
        r.merge_rate_grade
    ));

    Ok(md)
}
