//! Letter grading
//!
//! Table-driven mappings from efficiency percentage, average open
//! duration, and merged fraction to letter grades. Pure functions; the
//! thresholds are the reporting contract and are not configurable.

use crate::models::Grade;

/// Grade the efficiency percentage (share of total hours not wasted).
pub fn efficiency_grade(percent: f64) -> Grade {
    match percent {
        p if p >= 97.0 => Grade::new("A+", "Impeccable"),
        p if p >= 93.0 => Grade::new("A", "Excellent"),
        p if p >= 90.0 => Grade::new("A-", "Nearly excellent"),
        p if p >= 87.0 => Grade::new("B+", "Acceptable+"),
        p if p >= 83.0 => Grade::new("B", "Acceptable"),
        p if p >= 80.0 => Grade::new("B-", "Nearly acceptable"),
        p if p >= 70.0 => Grade::new("C", "Average"),
        p if p >= 60.0 => Grade::new("D", "Not good"),
        _ => Grade::new("F", "Failing"),
    }
}

/// Grade merge velocity from the average open duration in hours.
pub fn velocity_grade(avg_open_hours: f64) -> Grade {
    match avg_open_hours {
        h if h <= 4.0 => Grade::new("A+", "Same-day merges"),
        h if h <= 24.0 => Grade::new("A", "Merged within a day"),
        h if h <= 84.0 => Grade::new("B", "Merged within a few days"),
        h if h <= 132.0 => Grade::new("C", "Merged within a week"),
        h if h <= 168.0 => Grade::new("D", "A week on the vine"),
        _ => Grade::new("F", "PRs linger"),
    }
}

/// Grade the merged fraction (0.0 - 1.0) of closed PRs.
pub fn merge_rate_grade(merged_fraction: f64) -> Grade {
    match merged_fraction {
        f if f > 0.9 => Grade::new("A", "Nearly everything lands"),
        f if f > 0.8 => Grade::new("B", "Most work lands"),
        f if f > 0.7 => Grade::new("C", "Noticeable abandonment"),
        f if f > 0.6 => Grade::new("D", "Heavy abandonment"),
        _ => Grade::new("F", "Most PRs never land"),
    }
}
