//! Time-bucket sampling
//!
//! Selects a statistically representative subset of PR summaries by
//! partitioning the observed time span into equal buckets and taking the
//! most recent PR from each. This spreads observations across the window
//! instead of clustering at one edge, which matters because PR cost is
//! strongly correlated with age.
//!
//! The sampler does not filter bots; that policy belongs to the caller.
//! Output is stable given a stable input ordering.

use std::collections::BTreeSet;

use crate::models::PrSummary;

/// Select up to `desired` summaries spread across the time span.
///
/// If the input already fits the quota it is returned as-is (order
/// preserved). Otherwise PRs are sorted by `updated_at` descending, the
/// span from newest to oldest is cut into `desired` equal buckets, the
/// most recent PR of each non-empty bucket is selected, and any shortfall
/// from empty buckets is filled by scanning the remaining PRs newest-first.
pub fn sample(prs: &[PrSummary], desired: usize) -> Vec<PrSummary> {
    if prs.is_empty() || desired == 0 {
        return Vec::new();
    }
    if prs.len() <= desired {
        return prs.to_vec();
    }

    let mut sorted: Vec<&PrSummary> = prs.iter().collect();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

    let newest = sorted[0].updated_at;
    let oldest = sorted[sorted.len() - 1].updated_at;
    let span_seconds = (newest - oldest).num_seconds().max(0) as f64;
    let bucket_seconds = span_seconds / desired as f64;

    let mut bucket_taken = vec![false; desired];
    let mut selected: BTreeSet<usize> = BTreeSet::new();

    // Descending order means the first PR landing in a bucket is the most
    // recent one in it.
    for (idx, pr) in sorted.iter().enumerate() {
        let age_seconds = (newest - pr.updated_at).num_seconds().max(0) as f64;
        let bucket = if bucket_seconds > 0.0 {
            ((age_seconds / bucket_seconds) as usize).min(desired - 1)
        } else {
            0
        };
        if !bucket_taken[bucket] {
            bucket_taken[bucket] = true;
            selected.insert(idx);
        }
    }

    // Empty buckets leave a shortfall; top up newest-first.
    if selected.len() < desired {
        for idx in 0..sorted.len() {
            if selected.len() >= desired {
                break;
            }
            selected.insert(idx);
        }
    }

    // Emit in updated_at-descending order.
    selected.into_iter().map(|idx| sorted[idx].clone()).collect()
}
