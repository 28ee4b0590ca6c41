//! The cost model
//!
//! Transforms raw PR timeline data into itemized, reproducible cost
//! breakdowns and population-level projections. Every function in this
//! module is pure and synchronous: identical inputs (including the injected
//! clock) always produce identical outputs, and everything is safe to call
//! concurrently with distinct inputs.
//!
//! Pipeline: summaries -> [`sampling`] -> per-PR data -> [`calculator`]
//! (which leans on [`effort`] and [`sessions`]) -> [`extrapolate`] ->
//! [`grading`].

pub mod calculator;
pub mod effort;
pub mod extrapolate;
pub mod grading;
pub mod sampling;
pub mod sessions;

pub use calculator::calculate;
pub use effort::estimate_effort_hours;
pub use extrapolate::extrapolate;
pub use grading::{efficiency_grade, merge_rate_grade, velocity_grade};
pub use sampling::sample;
pub use sessions::{aggregate_sessions, SessionStats};
