//! `prcost init` command — write a starter config file

use anyhow::{bail, Context, Result};
use console::style;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# prcost configuration
#
# Every value shown is the built-in default; delete anything you don't
# want to override. CLI flags always win over this file.

[cost]
# The two biggest levers on absolute numbers.
annual_salary = 249000.0
benefits_multiplier = 1.3
productive_hours_per_year = 2080.0

# Attention model.
event_duration_minutes = 10.0
context_switch_minutes = 20.0
session_gap_minutes = 20.0

# Delay model.
delivery_delay_factor = 0.15
coordination_factor = 0.05
max_delay_after_last_event_days = 14.0
max_project_delay_days = 90.0
max_code_drift_days = 90.0

# Effort model.
review_inspection_rate = 275.0
modification_cost_factor = 0.5
effort_multiplier = 2.94
effort_exponent = 1.0997
min_effort_minutes = 20.0

# Open-PR tracking.
pr_tracking_minutes_per_week = 10.0
track_bot_prs = true

# Target average open duration for the fast-merge savings figure.
r2r_target_hours = 1.5

[defaults]
format = "text"
workers = 8
days = 30
samples = 30
"#;

pub fn run() -> Result<()> {
    let path = Path::new("prcost.toml");
    if path.exists() {
        bail!(
            "prcost.toml already exists; delete it first to regenerate, or edit it with {}",
            style("$EDITOR prcost.toml").cyan()
        );
    }
    std::fs::write(path, CONFIG_TEMPLATE).context("failed to write prcost.toml")?;
    println!("Wrote {}", style("prcost.toml").green());
    Ok(())
}
