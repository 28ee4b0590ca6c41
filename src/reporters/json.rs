//! JSON reporter for machine-readable output

use anyhow::Result;

use crate::models::Breakdown;
use crate::orchestrator::AnalysisReport;

pub fn render_breakdown(breakdown: &Breakdown) -> Result<String> {
    Ok(serde_json::to_string_pretty(breakdown)?)
}

pub fn render_report(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CostConfig;
    use crate::cost::calculate;
    use crate::models::{EventKind, ParticipantEvent, PrData};
    use chrono::{TimeZone, Utc};

    #[test]
    fn breakdown_json_round_trips() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let pr = PrData {
            url: "https://github.com/acme/widget/pull/1".into(),
            title: "Add widget".into(),
            author: "alice".into(),
            author_is_bot: false,
            created_at: created,
            closed_at: None,
            lines_added: 100,
            lines_modified: 10,
            events: vec![ParticipantEvent::new(created, "alice", EventKind::Commit)],
        };
        let breakdown = calculate(
            &pr,
            &CostConfig::default(),
            created + chrono::Duration::days(2),
        );

        let json = render_breakdown(&breakdown).unwrap();
        let parsed: Breakdown = serde_json::from_str(&json).unwrap();
        assert!((parsed.total_cost - breakdown.total_cost).abs() < 0.01);
        assert_eq!(parsed.author.author, "alice");
    }
}
