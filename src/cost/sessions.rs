//! Event-to-session aggregation
//!
//! Groups one actor's timeline events into work sessions and converts them
//! into attention hours. A session is a maximal run of events whose
//! consecutive gaps stay within the session-gap threshold; each event
//! contributes a fixed attention slice, and every session boundary charges
//! context-switch overhead.

use chrono::{DateTime, Utc};

use crate::config::CostConfig;
use crate::models::ParticipantEvent;

/// Attention-time summary for one actor on one PR.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    /// Event-based interaction time: one `event_duration` per event. Gaps
    /// within a session are not counted as work time.
    pub github_hours: f64,
    /// Context-switch overhead: one switch into the first session, one out
    /// of the last, and `min(2 * switch, gap)` across each inter-session
    /// gap so we never claim more switch time than wall-clock elapsed.
    pub context_hours: f64,
    pub sessions: usize,
}

/// Aggregate one actor's events into sessions and attention hours.
///
/// Events need not be sorted; they are stably sorted by timestamp first.
/// Empty input yields all-zero stats.
pub fn aggregate_sessions(events: &[ParticipantEvent], config: &CostConfig) -> SessionStats {
    if events.is_empty() {
        return SessionStats::default();
    }

    let mut timestamps: Vec<DateTime<Utc>> = events.iter().map(|e| e.timestamp).collect();
    timestamps.sort();

    let gap_threshold = config.session_gap_hours();
    let switch = config.context_switch_hours();

    let mut sessions = 1usize;
    let mut context_hours = 2.0 * switch;

    for pair in timestamps.windows(2) {
        let gap_hours = (pair[1] - pair[0]).num_seconds().max(0) as f64 / 3600.0;
        if gap_hours > gap_threshold {
            sessions += 1;
            // Full out-then-in overhead, capped by the actual gap.
            context_hours += (2.0 * switch).min(gap_hours);
        }
    }

    SessionStats {
        github_hours: events.len() as f64 * config.event_duration_hours(),
        context_hours,
        sessions,
    }
}
