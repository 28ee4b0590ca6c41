//! prcost - estimate what pull requests actually cost
//!
//! Turns raw PR timelines from the GitHub API into itemized dollar and
//! productivity-hour breakdowns: author effort from the diff size, reviewer
//! effort from inspection rates, attention time from event sessions, and
//! the delay cost of PRs sitting unmerged. Repo- and org-level analyses
//! sample the PR population and extrapolate, then grade the result.
//!
//! The model is an estimator, not a time tracker: it makes no causal
//! claims and no promises about any individual PR. What it does promise is
//! reproducibility - identical inputs (including the injected clock)
//! always produce identical outputs.
//!
//! Layering:
//! - [`cost`] - the pure cost model (effort, sessions, calculator,
//!   sampling, extrapolation, grading)
//! - [`models`] / [`config`] - the data types flowing through it
//! - [`github`] / [`cache`] - the data-access collaborators
//! - [`orchestrator`] - sampling + worker pool + aggregation
//! - [`reporters`] / [`cli`] - the user-facing surfaces

pub mod cache;
pub mod cli;
pub mod config;
pub mod cost;
pub mod github;
pub mod models;
pub mod orchestrator;
pub mod reporters;
