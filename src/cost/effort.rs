//! Size -> effort estimation
//!
//! Maps a line count to estimated engineer hours with a COCOMO-family
//! power curve: `person_months = multiplier * kloc^exponent`, converted at
//! the standard 152 hours per person-month. The default curve parameters
//! (2.94, 1.0997) are the organic-mode calibration used across the
//! code-counting literature.

use crate::config::CostConfig;

/// Standard COCOMO conversion from person-months to hours.
const HOURS_PER_PERSON_MONTH: f64 = 152.0;

/// Estimate engineer hours for writing `lines` lines of code.
///
/// Zero lines cost zero (no floor). Any non-empty change costs at least
/// `min_effort_minutes`. Monotonically non-decreasing in `lines`.
pub fn estimate_effort_hours(lines: u64, config: &CostConfig) -> f64 {
    if lines == 0 {
        return 0.0;
    }
    let kloc = lines as f64 / 1000.0;
    let person_months = config.effort_multiplier * kloc.powf(config.effort_exponent);
    let hours = person_months * HOURS_PER_PERSON_MONTH;
    hours.max(config.min_effort_hours())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_lines_cost_nothing() {
        assert_eq!(estimate_effort_hours(0, &CostConfig::default()), 0.0);
    }

    #[test]
    fn single_line_hits_the_floor() {
        let config = CostConfig::default();
        // Raw curve value for 1 line is ~0.22 h, below the 20-minute floor.
        let hours = estimate_effort_hours(1, &config);
        assert!((hours - config.min_effort_hours()).abs() < 1e-9);
    }

    #[test]
    fn ten_lines_clear_the_floor() {
        let config = CostConfig::default();
        // 2.94 * 0.01^1.0997 * 152 ~= 2.82 h
        let hours = estimate_effort_hours(10, &config);
        assert!(hours > config.min_effort_hours());
        assert!((hours - 2.824).abs() < 0.01);
    }

    #[test]
    fn monotone_non_decreasing() {
        let config = CostConfig::default();
        let mut prev = 0.0;
        for lines in [0u64, 1, 2, 5, 10, 50, 100, 1_000, 10_000, 100_000] {
            let hours = estimate_effort_hours(lines, &config);
            assert!(
                hours >= prev,
                "effort({lines}) = {hours} dipped below {prev}"
            );
            prev = hours;
        }
    }

    #[test]
    fn floor_applies_to_every_non_empty_change() {
        let config = CostConfig::default();
        for lines in 1..=20u64 {
            assert!(estimate_effort_hours(lines, &config) >= config.min_effort_hours());
        }
    }

    #[test]
    fn thousand_lines_is_one_curve_unit() {
        let config = CostConfig::default();
        // kloc = 1.0, so person_months = multiplier exactly.
        let hours = estimate_effort_hours(1_000, &config);
        assert!((hours - 2.94 * 152.0).abs() < 1e-9);
    }
}
