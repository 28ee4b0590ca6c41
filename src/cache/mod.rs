//! Fetch caching
//!
//! Wraps any [`PrFetcher`] with a two-layer cache keyed by PR URL and
//! `updated_at`: a concurrent in-memory map for the current process and a
//! JSON file per PR under the platform cache directory. Because the key
//! includes `updated_at`, a PR that changed since the last fetch misses
//! the cache naturally; stale entries are only ever dead weight, never
//! wrong answers.

use std::path::PathBuf;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::github::{GithubResult, PrFetcher};
use crate::models::{PrData, PrSummary};

/// Platform cache directory for prcost (`~/.cache/prcost` on Linux).
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("prcost"))
}

/// Stable cache key: sha256 over URL and updated_at.
fn cache_key(summary: &PrSummary) -> String {
    let mut hasher = Sha256::new();
    hasher.update(summary.url().as_bytes());
    hasher.update(b"\n");
    hasher.update(summary.updated_at.to_rfc3339().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A caching decorator around a fetcher.
pub struct FetchCache<F> {
    inner: F,
    /// Disk layer; `None` disables persistence (memory layer stays on).
    dir: Option<PathBuf>,
    memory: DashMap<String, PrData>,
}

impl<F> FetchCache<F> {
    /// Cache in the platform cache directory.
    pub fn new(inner: F) -> Self {
        Self::with_dir(inner, default_cache_dir())
    }

    /// Cache in an explicit directory, or memory-only with `None`.
    pub fn with_dir(inner: F, dir: Option<PathBuf>) -> Self {
        Self {
            inner,
            dir,
            memory: DashMap::new(),
        }
    }

    fn disk_path(&self, key: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(format!("{key}.json")))
    }

    fn load_disk(&self, key: &str) -> Option<PrData> {
        let path = self.disk_path(key)?;
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(data) => Some(data),
            Err(e) => {
                // Corrupt or outdated entry: drop it and refetch.
                warn!("discarding unreadable cache entry {}: {e}", path.display());
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    fn store_disk(&self, key: &str, data: &PrData) {
        let Some(path) = self.disk_path(key) else {
            return;
        };
        let Some(parent) = path.parent() else {
            return;
        };
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!("cannot create cache dir {}: {e}", parent.display());
            return;
        }
        match serde_json::to_string(data) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!("cannot write cache entry {}: {e}", path.display());
                }
            }
            Err(e) => warn!("cannot serialize cache entry: {e}"),
        }
    }
}

impl<F: PrFetcher> PrFetcher for FetchCache<F> {
    fn fetch_pr(&self, summary: &PrSummary) -> GithubResult<PrData> {
        let key = cache_key(summary);

        if let Some(hit) = self.memory.get(&key) {
            debug!("memory cache hit for {}", summary.url());
            return Ok(hit.clone());
        }
        if let Some(hit) = self.load_disk(&key) {
            debug!("disk cache hit for {}", summary.url());
            self.memory.insert(key, hit.clone());
            return Ok(hit);
        }

        let data = self.inner.fetch_pr(summary)?;
        self.store_disk(&key, &data);
        self.memory.insert(key, data.clone());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrState;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    impl PrFetcher for CountingFetcher {
        fn fetch_pr(&self, summary: &PrSummary) -> GithubResult<PrData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PrData {
                url: summary.url(),
                title: "cached".into(),
                author: summary.author.clone(),
                author_is_bot: false,
                created_at: summary.updated_at,
                closed_at: None,
                lines_added: 1,
                lines_modified: 0,
                events: Vec::new(),
            })
        }
    }

    fn summary(number: u64, hour: u32) -> PrSummary {
        PrSummary {
            owner: "acme".into(),
            repo: "widget".into(),
            number,
            author: "alice".into(),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            state: PrState::Open,
            merged: false,
        }
    }

    #[test]
    fn memory_layer_deduplicates_fetches() {
        let cache = FetchCache::with_dir(
            CountingFetcher {
                calls: AtomicUsize::new(0),
            },
            None,
        );
        let s = summary(1, 9);
        cache.fetch_pr(&s).unwrap();
        cache.fetch_pr(&s).unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn updated_at_change_misses_cache() {
        let cache = FetchCache::with_dir(
            CountingFetcher {
                calls: AtomicUsize::new(0),
            },
            None,
        );
        cache.fetch_pr(&summary(1, 9)).unwrap();
        cache.fetch_pr(&summary(1, 10)).unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn disk_layer_survives_new_process() {
        let dir = tempfile::tempdir().unwrap();
        let s = summary(7, 9);

        let first = FetchCache::with_dir(
            CountingFetcher {
                calls: AtomicUsize::new(0),
            },
            Some(dir.path().to_path_buf()),
        );
        first.fetch_pr(&s).unwrap();
        assert_eq!(first.inner.calls.load(Ordering::SeqCst), 1);

        // A fresh cache over the same directory serves from disk.
        let second = FetchCache::with_dir(
            CountingFetcher {
                calls: AtomicUsize::new(0),
            },
            Some(dir.path().to_path_buf()),
        );
        let data = second.fetch_pr(&s).unwrap();
        assert_eq!(data.title, "cached");
        assert_eq!(second.inner.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn corrupt_entry_falls_through_to_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let s = summary(3, 9);
        let key = cache_key(&s);
        std::fs::write(dir.path().join(format!("{key}.json")), "not json").unwrap();

        let cache = FetchCache::with_dir(
            CountingFetcher {
                calls: AtomicUsize::new(0),
            },
            Some(dir.path().to_path_buf()),
        );
        cache.fetch_pr(&s).unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
    }
}
