//! Text (terminal) reporter — the itemized bill

use anyhow::Result;

use super::{hours_fmt, money};
use crate::models::Breakdown;
use crate::orchestrator::AnalysisReport;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Grade colors (ANSI escape codes)
fn grade_color(letter: &str) -> &'static str {
    match letter.trim_end_matches(['+', '-']) {
        "A" => "\x1b[32m", // Green
        "B" => "\x1b[92m", // Light green
        "C" => "\x1b[33m", // Yellow
        "D" => "\x1b[91m", // Light red
        _ => "\x1b[31m",   // Red
    }
}

fn line(out: &mut String, label: &str, hours: f64, cost: f64) {
    // Skip all-zero items so closed PRs don't show empty future costs.
    if hours == 0.0 && cost == 0.0 {
        return;
    }
    out.push_str(&format!(
        "  {label:<22} {:>10}  {:>14}\n",
        hours_fmt(hours),
        money(cost)
    ));
}

/// Render a single-PR breakdown as a terminal bill.
pub fn render_breakdown(b: &Breakdown) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}PR Cost Analysis{RESET}  {}\n", b.url));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────────────────{RESET}\n"
    ));
    if !b.title.is_empty() {
        out.push_str(&format!("{}\n", b.title));
    }
    out.push_str(&format!(
        "Author: {}{}  Diff: +{} / ~{} LOC  Open: {}\n\n",
        b.author.author,
        if b.author_is_bot { " (bot)" } else { "" },
        b.lines_added,
        b.lines_modified,
        hours_fmt(b.pr_duration_hours)
    ));

    out.push_str(&format!(
        "{BOLD}AUTHOR{RESET} {DIM}({} events, {} sessions){RESET}\n",
        b.author.events, b.author.sessions
    ));
    line(&mut out, "New code", b.author.new_code_hours, b.author.new_code_cost);
    line(
        &mut out,
        "Adaptation",
        b.author.adaptation_hours,
        b.author.adaptation_cost,
    );
    line(&mut out, "GitHub activity", b.author.github_hours, b.author.github_cost);
    line(
        &mut out,
        "Context switching",
        b.author.github_context_hours,
        b.author.github_context_cost,
    );
    line(&mut out, "Subtotal", b.author.total_hours, b.author.total_cost);

    if !b.participants.is_empty() {
        out.push_str(&format!(
            "\n{BOLD}PARTICIPANTS{RESET} {DIM}({}){RESET}\n",
            b.participants.len()
        ));
        for p in &b.participants {
            out.push_str(&format!(
                "  {} {DIM}({} events, {} sessions){RESET}\n",
                p.actor, p.events, p.sessions
            ));
            line(&mut out, "  Review (by LOC)", p.review_hours, p.review_cost);
            line(&mut out, "  GitHub activity", p.github_hours, p.github_cost);
            line(
                &mut out,
                "  Context switching",
                p.github_context_hours,
                p.github_context_cost,
            );
            line(&mut out, "  Subtotal", p.total_hours, p.total_cost);
        }
    }

    out.push_str(&format!(
        "\n{BOLD}DELAY{RESET}{}\n",
        if b.delay.delay_capped {
            format!(" {DIM}(capped){RESET}")
        } else {
            String::new()
        }
    ));
    line(
        &mut out,
        "Delivery delay",
        b.delay.delivery_delay_hours,
        b.delay.delivery_delay_cost,
    );
    line(
        &mut out,
        "Coordination",
        b.delay.coordination_hours,
        b.delay.coordination_cost,
    );
    if b.delay.code_churn_cost > 0.0 {
        line(
            &mut out,
            &format!("Code churn ({:.1}%)", b.delay.rework_percent),
            b.delay.code_churn_hours,
            b.delay.code_churn_cost,
        );
    }
    line(
        &mut out,
        "Future review",
        b.delay.future_review_hours,
        b.delay.future_review_cost,
    );
    line(
        &mut out,
        "Future merge",
        b.delay.future_merge_hours,
        b.delay.future_merge_cost,
    );
    line(
        &mut out,
        "Future context",
        b.delay.future_context_hours,
        b.delay.future_context_cost,
    );
    line(&mut out, "Subtotal", b.delay.total_hours, b.delay.total_cost);

    out.push_str(&format!(
        "\n{BOLD}TOTAL{RESET}  {} {DIM}({} at {}/h){RESET}\n",
        money(b.total_cost),
        hours_fmt(b.total_hours),
        money(b.hourly_rate)
    ));

    Ok(out)
}

/// Render a repo/org analysis report as terminal output.
pub fn render_report(r: &AnalysisReport) -> Result<String> {
    let x = &r.breakdown;
    let mut out = String::new();

    out.push_str(&format!(
        "\n{BOLD}Cost Analysis{RESET}  {}  {DIM}({:.0}-day window){RESET}\n",
        r.scope, x.actual_days
    ));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "PRs: {} total, {} sampled, {} analyzed  Authors: {}  Open now: {}\n",
        x.total_prs, x.sampled_prs, x.successful_samples, x.total_authors, x.open_prs
    ));
    out.push_str(&format!(
        "Human PRs: {} (+{} / ~{} LOC)  Bot PRs: {} (+{} / ~{} LOC)\n",
        x.human_prs,
        x.human_lines_added,
        x.human_lines_modified,
        x.bot_prs,
        x.bot_lines_added,
        x.bot_lines_modified
    ));
    out.push_str(&format!(
        "Avg open: {}  {DIM}(human {}, bot {}){RESET}\n\n",
        hours_fmt(x.avg_open_hours),
        hours_fmt(x.avg_human_open_hours),
        hours_fmt(x.avg_bot_open_hours)
    ));

    out.push_str(&format!("{BOLD}COST{RESET} {DIM}(extrapolated){RESET}\n"));
    line(
        &mut out,
        "New code",
        x.new_code_hours + x.adaptation_hours,
        x.new_code_cost + x.adaptation_cost,
    );
    line(&mut out, "Code review", x.review_hours, x.review_cost);
    line(
        &mut out,
        "GitHub activity",
        x.author_github_hours + x.participant_github_hours,
        x.author_github_cost + x.participant_github_cost,
    );
    line(
        &mut out,
        "Context switching",
        x.author_context_hours + x.participant_context_hours,
        x.author_context_cost + x.participant_context_cost,
    );
    line(
        &mut out,
        "Delivery delay",
        x.delivery_delay_hours,
        x.delivery_delay_cost,
    );
    line(&mut out, "Coordination", x.coordination_hours, x.coordination_cost);
    line(&mut out, "Code churn", x.code_churn_hours, x.code_churn_cost);
    line(
        &mut out,
        "Future completion",
        x.future_review_hours + x.future_merge_hours + x.future_context_hours,
        x.future_review_cost + x.future_merge_cost + x.future_context_cost,
    );
    line(
        &mut out,
        "Automated updates",
        x.automated_updates_hours,
        x.automated_updates_cost,
    );
    line(&mut out, "PR tracking", x.pr_tracking_hours, x.pr_tracking_cost);
    line(&mut out, "TOTAL", x.total_hours, x.total_cost);

    out.push_str(&format!("\n{BOLD}WASTE{RESET}\n"));
    line(&mut out, "Preventable", x.preventable_hours, x.preventable_cost);
    out.push_str(&format!("  {:<22} {:>10}  {:>14}\n", "Per week", "", money(x.waste_per_week)));
    out.push_str(&format!(
        "  {:<22} {:>10}  {:>14}\n",
        "Per author per week", "", money(x.waste_per_author_per_week)
    ));
    out.push_str(&format!(
        "  {:<22} {:>10}  {:>14}  {DIM}≈ {:.2} engineers{RESET}\n",
        "Annualized",
        "",
        money(x.annual_waste),
        x.headcount_equivalent
    ));
    if x.r2r_savings > 0.0 {
        out.push_str(&format!(
            "  {:<22} {:>10}  {:>14}  {DIM}if PRs merged at the target pace{RESET}\n",
            "Fast-merge savings",
            "",
            money(x.r2r_savings)
        ));
    }

    out.push_str(&format!("\n{BOLD}GRADES{RESET}\n"));
    let eff = &x.efficiency_grade;
    out.push_str(&format!(
        "  Efficiency   {:.1}%  {}{BOLD}{}{RESET} {DIM}({}){RESET}\n",
        x.efficiency_percent,
        grade_color(&eff.letter),
        eff.letter,
        eff.message
    ));
    let vel = &x.velocity_grade;
    out.push_str(&format!(
        "  Velocity     {}{BOLD}{}{RESET} {DIM}({}){RESET}\n",
        grade_color(&vel.letter),
        vel.letter,
        vel.message
    ));
    out.push_str(&format!(
        "  Merge rate   {:.0}%  {}{BOLD}{}{RESET} {DIM}({}){RESET}\n",
        r.merge_rate * 100.0,
        grade_color(&r.merge_rate_grade.letter),
        r.merge_rate_grade.letter,
        r.merge_rate_grade.message
    ));

    Ok(out)
}
