//! Configuration for the cost model
//!
//! This module handles:
//! - The cost-model knobs (`CostConfig`), all overridable
//! - Project-level configuration (prcost.toml)
//! - CLI defaults
//!
//! Salary and benefits have the largest effect on absolute numbers; the
//! delay factors and caps govern the shape of the delay model. The curve
//! and rate defaults come from public research (COCOMO-family size/effort
//! curves, code-inspection-rate studies); calibrate per organization by
//! overriding them in prcost.toml or on the command line.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Fallback for a zero or negative productive-hours setting.
const FALLBACK_PRODUCTIVE_HOURS: f64 = 2080.0;

/// Errors from validating user-supplied configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("annual salary must be positive, got {0}")]
    InvalidSalary(f64),

    #[error("benefits multiplier must be positive, got {0}")]
    InvalidBenefits(f64),

    #[error("{name} must be positive, got {value}")]
    InvalidFactor { name: &'static str, value: f64 },
}

/// Immutable cost-model configuration, created once per analysis.
///
/// Durations that engineers reason about in minutes are stored in minutes;
/// accessor methods convert to hours for the model arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// Annual salary in dollars.
    #[serde(default = "default_annual_salary")]
    pub annual_salary: f64,

    /// Fully-loaded multiplier on salary (benefits, overhead).
    #[serde(default = "default_benefits_multiplier")]
    pub benefits_multiplier: f64,

    /// Productive engineering hours per year.
    #[serde(default = "default_productive_hours")]
    pub productive_hours_per_year: f64,

    /// Attention charged per timeline event.
    #[serde(default = "default_event_duration")]
    pub event_duration_minutes: f64,

    /// One-way cost of switching into or out of a work session.
    #[serde(default = "default_context_switch")]
    pub context_switch_minutes: f64,

    /// Gap between events that starts a new session.
    #[serde(default = "default_session_gap")]
    pub session_gap_minutes: f64,

    /// Fraction of elapsed PR time charged as blocked-value opportunity cost.
    #[serde(default = "default_delivery_delay_factor")]
    pub delivery_delay_factor: f64,

    /// Fraction of elapsed PR time charged as tracking overhead.
    #[serde(default = "default_coordination_factor")]
    pub coordination_factor: f64,

    /// Delay accrual stops this long after the last timeline event.
    #[serde(default = "default_max_delay_after_last_event")]
    pub max_delay_after_last_event_days: f64,

    /// Absolute ceiling on charged delay time.
    #[serde(default = "default_max_project_delay")]
    pub max_project_delay_days: f64,

    /// Ceiling on the code-drift window for the churn model.
    #[serde(default = "default_max_code_drift")]
    pub max_code_drift_days: f64,

    /// Lines of code a reviewer inspects per hour.
    #[serde(default = "default_review_inspection_rate")]
    pub review_inspection_rate: f64,

    /// Discount applied to modified (vs newly written) lines.
    #[serde(default = "default_modification_cost_factor")]
    pub modification_cost_factor: f64,

    /// Multiplier of the size -> effort curve.
    #[serde(default = "default_effort_multiplier")]
    pub effort_multiplier: f64,

    /// Exponent of the size -> effort curve.
    #[serde(default = "default_effort_exponent")]
    pub effort_exponent: f64,

    /// Minimum effort charged for any non-empty change.
    #[serde(default = "default_min_effort")]
    pub min_effort_minutes: f64,

    /// Weekly attention charged per open PR.
    #[serde(default = "default_pr_tracking")]
    pub pr_tracking_minutes_per_week: f64,

    /// Whether bot-authored open PRs count toward tracking cost.
    #[serde(default = "default_track_bot_prs")]
    pub track_bot_prs: bool,

    /// Target average open duration for the ready-to-review savings figure.
    #[serde(default = "default_r2r_target")]
    pub r2r_target_hours: f64,
}

fn default_annual_salary() -> f64 {
    249_000.0
}
fn default_benefits_multiplier() -> f64 {
    1.3
}
fn default_productive_hours() -> f64 {
    FALLBACK_PRODUCTIVE_HOURS
}
fn default_event_duration() -> f64 {
    10.0
}
fn default_context_switch() -> f64 {
    20.0
}
fn default_session_gap() -> f64 {
    20.0
}
fn default_delivery_delay_factor() -> f64 {
    0.15
}
fn default_coordination_factor() -> f64 {
    0.05
}
fn default_max_delay_after_last_event() -> f64 {
    14.0
}
fn default_max_project_delay() -> f64 {
    90.0
}
fn default_max_code_drift() -> f64 {
    90.0
}
fn default_review_inspection_rate() -> f64 {
    275.0
}
fn default_modification_cost_factor() -> f64 {
    0.5
}
fn default_effort_multiplier() -> f64 {
    2.94
}
fn default_effort_exponent() -> f64 {
    1.0997
}
fn default_min_effort() -> f64 {
    20.0
}
fn default_pr_tracking() -> f64 {
    10.0
}
fn default_track_bot_prs() -> bool {
    true
}
fn default_r2r_target() -> f64 {
    1.5
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            annual_salary: default_annual_salary(),
            benefits_multiplier: default_benefits_multiplier(),
            productive_hours_per_year: default_productive_hours(),
            event_duration_minutes: default_event_duration(),
            context_switch_minutes: default_context_switch(),
            session_gap_minutes: default_session_gap(),
            delivery_delay_factor: default_delivery_delay_factor(),
            coordination_factor: default_coordination_factor(),
            max_delay_after_last_event_days: default_max_delay_after_last_event(),
            max_project_delay_days: default_max_project_delay(),
            max_code_drift_days: default_max_code_drift(),
            review_inspection_rate: default_review_inspection_rate(),
            modification_cost_factor: default_modification_cost_factor(),
            effort_multiplier: default_effort_multiplier(),
            effort_exponent: default_effort_exponent(),
            min_effort_minutes: default_min_effort(),
            pr_tracking_minutes_per_week: default_pr_tracking(),
            track_bot_prs: default_track_bot_prs(),
            r2r_target_hours: default_r2r_target(),
        }
    }
}

impl CostConfig {
    /// Fully-loaded hourly rate. Guards against a zero or negative
    /// productive-hours setting by falling back to 2080.
    pub fn hourly_rate(&self) -> f64 {
        let hours = if self.productive_hours_per_year > 0.0 {
            self.productive_hours_per_year
        } else {
            FALLBACK_PRODUCTIVE_HOURS
        };
        self.annual_salary * self.benefits_multiplier / hours
    }

    pub fn event_duration_hours(&self) -> f64 {
        self.event_duration_minutes / 60.0
    }

    pub fn context_switch_hours(&self) -> f64 {
        self.context_switch_minutes / 60.0
    }

    pub fn session_gap_hours(&self) -> f64 {
        self.session_gap_minutes / 60.0
    }

    pub fn min_effort_hours(&self) -> f64 {
        self.min_effort_minutes / 60.0
    }

    pub fn max_delay_after_last_event_hours(&self) -> f64 {
        self.max_delay_after_last_event_days * 24.0
    }

    pub fn max_project_delay_hours(&self) -> f64 {
        self.max_project_delay_days * 24.0
    }

    pub fn pr_tracking_hours_per_week(&self) -> f64 {
        self.pr_tracking_minutes_per_week / 60.0
    }

    /// Reject configurations that would make the model meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.annual_salary <= 0.0 {
            return Err(ConfigError::InvalidSalary(self.annual_salary));
        }
        if self.benefits_multiplier <= 0.0 {
            return Err(ConfigError::InvalidBenefits(self.benefits_multiplier));
        }
        for (name, value) in [
            ("event_duration_minutes", self.event_duration_minutes),
            ("context_switch_minutes", self.context_switch_minutes),
            ("session_gap_minutes", self.session_gap_minutes),
            ("effort_multiplier", self.effort_multiplier),
            ("effort_exponent", self.effort_exponent),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::InvalidFactor { name, value });
            }
        }
        Ok(())
    }
}

/// Project-level configuration loaded from prcost.toml.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Cost-model overrides. Missing fields keep their defaults.
    #[serde(default)]
    pub cost: Option<CostConfig>,

    /// Default CLI flags.
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Default CLI flags that can be set in project config.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default output format (text, json, markdown)
    #[serde(default)]
    pub format: Option<String>,

    /// Default number of workers
    #[serde(default)]
    pub workers: Option<usize>,

    /// Default analysis window in days
    #[serde(default)]
    pub days: Option<u64>,

    /// Default sample size for repo/org analyses
    #[serde(default)]
    pub samples: Option<usize>,
}

/// Load project configuration from `prcost.toml` in the given directory.
///
/// Returns default configuration if no config file is found or if the file
/// fails to parse (with a warning, so a stray file never blocks analysis).
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    let toml_path = dir.join("prcost.toml");
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

fn load_toml_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hourly_rate() {
        let config = CostConfig::default();
        // 249_000 * 1.3 / 2080
        assert!((config.hourly_rate() - 155.625).abs() < 0.01);
    }

    #[test]
    fn zero_productive_hours_falls_back() {
        let config = CostConfig {
            productive_hours_per_year: 0.0,
            ..CostConfig::default()
        };
        assert!((config.hourly_rate() - 155.625).abs() < 0.01);
    }

    #[test]
    fn validate_rejects_non_positive_salary() {
        let config = CostConfig {
            annual_salary: 0.0,
            ..CostConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(CostConfig::default().validate().is_ok());
    }

    #[test]
    fn toml_overrides_only_named_fields() {
        let parsed: ProjectConfig = toml::from_str(
            r#"
            [cost]
            annual_salary = 180000.0
            delivery_delay_factor = 0.10

            [defaults]
            workers = 4
            format = "json"
            "#,
        )
        .unwrap();

        let cost = parsed.cost.unwrap();
        assert_eq!(cost.annual_salary, 180_000.0);
        assert_eq!(cost.delivery_delay_factor, 0.10);
        // Untouched fields keep their defaults.
        assert_eq!(cost.coordination_factor, 0.05);
        assert_eq!(cost.review_inspection_rate, 275.0);
        assert_eq!(parsed.defaults.workers, Some(4));
        assert_eq!(parsed.defaults.format.as_deref(), Some("json"));
    }

    #[test]
    fn minute_accessors_convert_to_hours() {
        let config = CostConfig::default();
        assert!((config.event_duration_hours() - 10.0 / 60.0).abs() < 1e-12);
        assert!((config.context_switch_hours() - 20.0 / 60.0).abs() < 1e-12);
        assert!((config.min_effort_hours() - 20.0 / 60.0).abs() < 1e-12);
        assert!((config.max_project_delay_hours() - 2160.0).abs() < 1e-9);
    }
}
