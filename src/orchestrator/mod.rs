//! Analysis orchestration
//!
//! Drives a repository or organization analysis end to end: list summaries,
//! sample, fetch + calculate each sample on a bounded worker pool, then
//! extrapolate and grade. The cost model itself is pure; all concurrency
//! lives here.
//!
//! ```text
//! summaries -> Sampler -> [worker pool: fetch -> calculate] -> Extrapolator
//!                                                            -> Grader
//! ```
//!
//! Per-sample lifecycle: queued -> fetching -> processing -> complete | error.
//! A failed fetch drops the sample with a warning; the analysis only fails
//! outright when every sample failed.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, CostConfig};
use crate::cost::{calculate, extrapolate, merge_rate_grade, sample};
use crate::github::{is_bot_login, GithubError, PrFetcher, PrSource};
use crate::models::{Breakdown, ExtrapolatedBreakdown, Grade, PrState, PrSummary};

/// Default bound on concurrent fetch+calculate tasks.
pub const DEFAULT_WORKERS: usize = 8;

/// Default sample size for repo/org analyses.
pub const DEFAULT_SAMPLES: usize = 30;

/// Lifecycle of one sampled PR inside the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleState {
    Queued,
    Fetching,
    Processing,
    Complete,
    Error,
}

impl std::fmt::Display for SampleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleState::Queued => write!(f, "queued"),
            SampleState::Fetching => write!(f, "fetching"),
            SampleState::Processing => write!(f, "processing"),
            SampleState::Complete => write!(f, "complete"),
            SampleState::Error => write!(f, "error"),
        }
    }
}

/// Progress callback: (summary, new state, done count, total count).
pub type ProgressCallback = Arc<dyn Fn(&PrSummary, SampleState, usize, usize) + Send + Sync>;

/// Errors from running an analysis.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("no samples could be processed ({attempted} attempted, all fetches failed)")]
    NoSamples { attempted: usize },

    #[error("analysis cancelled")]
    Cancelled,

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Github(#[from] GithubError),
}

/// Final report for a repository or organization analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// "owner/repo" or just "owner" for an org-wide analysis.
    pub scope: String,
    /// The window the caller asked for, in days.
    pub requested_days: u64,
    pub breakdown: ExtrapolatedBreakdown,
    /// Merged fraction of the closed PRs in the window (0.0 - 1.0).
    pub merge_rate: f64,
    pub merge_rate_grade: Grade,
}

/// Coordinates fetching, sampling, parallel calculation, and extrapolation.
pub struct Orchestrator<S, F> {
    source: S,
    fetcher: F,
    config: CostConfig,
    workers: usize,
    now: DateTime<Utc>,
    cancel: Arc<AtomicBool>,
    progress: Option<ProgressCallback>,
}

impl<S: PrSource, F: PrFetcher> Orchestrator<S, F> {
    pub fn new(source: S, fetcher: F, config: CostConfig) -> Self {
        Self {
            source,
            fetcher,
            config,
            workers: DEFAULT_WORKERS,
            now: Utc::now(),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }

    /// Bound the worker pool (minimum 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Inject a fixed clock for reproducible analyses.
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Share a cancellation flag; setting it aborts in-flight work. Keeping
    /// this decoupled from any client connection means a streaming client
    /// timing out does not have to waste completed work.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn report_progress(&self, summary: &PrSummary, state: SampleState, done: usize, total: usize) {
        if let Some(callback) = &self.progress {
            callback(summary, state, done, total);
        }
    }

    /// Analyze a single PR.
    pub fn analyze_pr(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Breakdown, AnalyzeError> {
        self.config.validate()?;

        // No summary exists for a direct URL; stamp the pseudo-summary with
        // the current clock so the fetch cache never serves stale data.
        let summary = PrSummary {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            author: String::new(),
            updated_at: self.now,
            state: PrState::Open,
            merged: false,
        };

        let data = self.fetcher.fetch_pr(&summary)?;
        Ok(calculate(&data, &self.config, self.now))
    }

    /// Analyze one repository over the trailing window.
    pub fn analyze_repo(
        &self,
        owner: &str,
        repo: &str,
        days: u64,
        samples: usize,
    ) -> Result<AnalysisReport, AnalyzeError> {
        self.analyze(owner, Some(repo), days, samples)
    }

    /// Analyze every repository of an organization.
    pub fn analyze_org(
        &self,
        org: &str,
        days: u64,
        samples: usize,
    ) -> Result<AnalysisReport, AnalyzeError> {
        self.analyze(org, None, days, samples)
    }

    fn analyze(
        &self,
        owner: &str,
        repo: Option<&str>,
        days: u64,
        samples: usize,
    ) -> Result<AnalysisReport, AnalyzeError> {
        self.config.validate()?;

        let scope = match repo {
            Some(repo) => format!("{owner}/{repo}"),
            None => owner.to_string(),
        };
        let since = self.now - chrono::Duration::days(days as i64);

        info!("listing PRs for {scope} over the past {days} days");
        let summaries = self.source.list_prs(owner, repo, since)?;
        let total_prs = summaries.len() as u64;

        // The list endpoint caps at 1000 results. When saturated, the
        // window we actually observed is narrower than requested; recompute
        // it from the oldest summary so per-week numbers stay honest.
        let mut actual_days = days as f64;
        if summaries.len() >= 1000 {
            if let Some(oldest) = summaries.last() {
                let observed =
                    (self.now - oldest.updated_at).num_seconds().max(0) as f64 / 86_400.0;
                actual_days = observed.clamp(1.0, days as f64);
                warn!(
                    "hit the 1000-PR listing cap; narrowing window to {actual_days:.1} days"
                );
            }
        }

        let open_prs = self.source.count_open_prs(owner, repo)?;

        // Canonical population author count: every distinct human login
        // seen in the window, merged or not.
        let mut authors: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
        for summary in &summaries {
            if !summary.author.is_empty() && !is_bot_login(&summary.author) {
                authors.insert(summary.author.as_str());
            }
        }
        let total_authors = authors.len() as u64;

        let selected = sample(&summaries, samples);
        debug!(
            "sampled {} of {} PRs ({} workers)",
            selected.len(),
            summaries.len(),
            self.workers
        );
        for summary in &selected {
            self.report_progress(summary, SampleState::Queued, 0, selected.len());
        }

        let breakdowns = self.process_samples(&selected)?;
        if self.cancelled() {
            return Err(AnalyzeError::Cancelled);
        }
        if breakdowns.is_empty() {
            return Err(AnalyzeError::NoSamples {
                attempted: selected.len(),
            });
        }

        let breakdown = extrapolate(
            &breakdowns,
            total_prs,
            total_authors,
            open_prs,
            selected.len(),
            actual_days,
            &self.config,
        );

        // Merge rate over the closed PRs in the window; with nothing closed
        // yet there is nothing abandoned either.
        let closed: Vec<&PrSummary> = summaries
            .iter()
            .filter(|s| s.state == PrState::Closed)
            .collect();
        let merge_rate = if closed.is_empty() {
            1.0
        } else {
            closed.iter().filter(|s| s.merged).count() as f64 / closed.len() as f64
        };

        Ok(AnalysisReport {
            scope,
            requested_days: days,
            breakdown,
            merge_rate,
            merge_rate_grade: merge_rate_grade(merge_rate),
        })
    }

    /// Fetch and calculate every sample on the bounded pool. Results land
    /// behind a single mutex; ordering is irrelevant because aggregation is
    /// commutative.
    fn process_samples(&self, selected: &[PrSummary]) -> Result<Vec<Breakdown>, AnalyzeError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| AnalyzeError::WorkerPool(e.to_string()))?;

        let results: Mutex<Vec<Breakdown>> = Mutex::new(Vec::with_capacity(selected.len()));
        let done = AtomicUsize::new(0);
        let total = selected.len();

        pool.install(|| {
            selected.par_iter().for_each(|summary| {
                if self.cancelled() {
                    return;
                }
                self.report_progress(summary, SampleState::Fetching, done.load(Ordering::SeqCst), total);

                match self.fetcher.fetch_pr(summary) {
                    Ok(data) => {
                        self.report_progress(
                            summary,
                            SampleState::Processing,
                            done.load(Ordering::SeqCst),
                            total,
                        );
                        let breakdown = calculate(&data, &self.config, self.now);
                        results
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(breakdown);
                        let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                        self.report_progress(summary, SampleState::Complete, finished, total);
                    }
                    Err(e) => {
                        warn!("skipping {}: {e}", summary.url());
                        let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                        self.report_progress(summary, SampleState::Error, finished, total);
                    }
                }
            });
        });

        Ok(results.into_inner().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKind, ParticipantEvent, PrData};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn summary(number: u64, days_ago: i64, author: &str, merged: bool) -> PrSummary {
        PrSummary {
            owner: "acme".into(),
            repo: "widget".into(),
            number,
            author: author.into(),
            updated_at: fixed_now() - chrono::Duration::days(days_ago),
            state: if merged { PrState::Closed } else { PrState::Open },
            merged,
        }
    }

    struct FakeSource {
        summaries: Vec<PrSummary>,
        open: u64,
    }

    impl PrSource for FakeSource {
        fn list_prs(
            &self,
            _owner: &str,
            _repo: Option<&str>,
            _since: DateTime<Utc>,
        ) -> crate::github::GithubResult<Vec<PrSummary>> {
            Ok(self.summaries.clone())
        }

        fn count_open_prs(
            &self,
            _owner: &str,
            _repo: Option<&str>,
        ) -> crate::github::GithubResult<u64> {
            Ok(self.open)
        }
    }

    /// Fetcher that fails for PR numbers in `failing`.
    struct FakeFetcher {
        failing: Vec<u64>,
    }

    impl PrFetcher for FakeFetcher {
        fn fetch_pr(&self, summary: &PrSummary) -> crate::github::GithubResult<PrData> {
            if self.failing.contains(&summary.number) {
                return Err(GithubError::Http("boom".into()));
            }
            let created = summary.updated_at - chrono::Duration::hours(6);
            Ok(PrData {
                url: summary.url(),
                title: format!("PR {}", summary.number),
                author: summary.author.clone(),
                author_is_bot: is_bot_login(&summary.author),
                created_at: created,
                closed_at: summary.merged.then(|| summary.updated_at),
                lines_added: 120,
                lines_modified: 30,
                events: vec![ParticipantEvent::new(created, summary.author.clone(), EventKind::Commit)],
            })
        }
    }

    fn orchestrator(
        summaries: Vec<PrSummary>,
        open: u64,
        failing: Vec<u64>,
    ) -> Orchestrator<FakeSource, FakeFetcher> {
        Orchestrator::new(
            FakeSource { summaries, open },
            FakeFetcher { failing },
            CostConfig::default(),
        )
        .with_workers(4)
        .with_clock(fixed_now())
    }

    #[test]
    fn repo_analysis_end_to_end() {
        let summaries = vec![
            summary(1, 1, "alice", true),
            summary(2, 5, "bob", true),
            summary(3, 9, "alice", false),
            summary(4, 14, "carol", false),
        ];
        let orch = orchestrator(summaries, 2, vec![]);
        let report = orch.analyze_repo("acme", "widget", 30, 10).unwrap();

        assert_eq!(report.scope, "acme/widget");
        assert_eq!(report.breakdown.total_prs, 4);
        assert_eq!(report.breakdown.successful_samples, 4);
        assert_eq!(report.breakdown.total_authors, 3);
        assert_eq!(report.breakdown.open_prs, 2);
        assert!(report.breakdown.total_cost > 0.0);
        // Two closed, both merged.
        assert!((report.merge_rate - 1.0).abs() < 1e-9);
        assert_eq!(report.merge_rate_grade.letter, "A");
    }

    #[test]
    fn failed_fetches_are_dropped() {
        let summaries = vec![
            summary(1, 1, "alice", true),
            summary(2, 5, "bob", true),
            summary(3, 9, "carol", true),
        ];
        let orch = orchestrator(summaries, 0, vec![2]);
        let report = orch.analyze_repo("acme", "widget", 30, 10).unwrap();
        assert_eq!(report.breakdown.successful_samples, 2);
        assert_eq!(report.breakdown.sampled_prs, 3);
    }

    #[test]
    fn all_failures_is_an_error() {
        let summaries = vec![summary(1, 1, "alice", true), summary(2, 2, "bob", true)];
        let orch = orchestrator(summaries, 0, vec![1, 2]);
        let err = orch.analyze_repo("acme", "widget", 30, 10).unwrap_err();
        assert!(matches!(err, AnalyzeError::NoSamples { attempted: 2 }));
    }

    #[test]
    fn cancellation_discards_partial_results() {
        let summaries = vec![summary(1, 1, "alice", true)];
        let orch = orchestrator(summaries, 0, vec![]);
        orch.cancel_flag().store(true, Ordering::SeqCst);
        let err = orch.analyze_repo("acme", "widget", 30, 10).unwrap_err();
        assert!(matches!(err, AnalyzeError::Cancelled));
    }

    #[test]
    fn saturation_narrows_the_window() {
        // Exactly 1000 summaries spread over 10 days against a requested
        // 90-day window: the effective window shrinks to the observed span.
        let summaries: Vec<PrSummary> = (0..1000u64)
            .map(|i| summary(i, (i % 10) as i64, "alice", true))
            .collect();
        let orch = orchestrator(summaries, 0, vec![]);
        let report = orch.analyze_repo("acme", "widget", 90, 5).unwrap();
        assert!(report.breakdown.actual_days <= 10.0);
        assert_eq!(report.requested_days, 90);
    }

    #[test]
    fn single_pr_analysis() {
        let orch = orchestrator(vec![], 0, vec![]);
        let breakdown = orch.analyze_pr("acme", "widget", 77).unwrap();
        assert_eq!(breakdown.url, "https://github.com/acme/widget/pull/77");
        assert!(breakdown.total_cost > 0.0);
    }

    #[test]
    fn access_denied_surfaces_for_single_pr() {
        struct DeniedFetcher;
        impl PrFetcher for DeniedFetcher {
            fn fetch_pr(&self, s: &PrSummary) -> crate::github::GithubResult<PrData> {
                Err(GithubError::AccessDenied(s.url()))
            }
        }
        let orch = Orchestrator::new(
            FakeSource {
                summaries: vec![],
                open: 0,
            },
            DeniedFetcher,
            CostConfig::default(),
        )
        .with_clock(fixed_now());
        let err = orch.analyze_pr("acme", "widget", 1).unwrap_err();
        assert!(matches!(err, AnalyzeError::Github(GithubError::AccessDenied(_))));
    }

    #[test]
    fn bot_prs_split_out_in_report() {
        let summaries = vec![
            summary(1, 1, "alice", true),
            summary(2, 2, "dependabot[bot]", true),
        ];
        let orch = orchestrator(summaries, 0, vec![]);
        let report = orch.analyze_repo("acme", "widget", 30, 10).unwrap();
        assert_eq!(report.breakdown.human_prs, 1);
        assert_eq!(report.breakdown.bot_prs, 1);
        // Bot authors never count toward the population author count.
        assert_eq!(report.breakdown.total_authors, 1);
    }
}
