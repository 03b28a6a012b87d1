//! Fetch counters for the data store.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for remote fetches and cache lookups.
#[derive(Debug, Default)]
pub struct FetchStats {
    /// Calls made to the remote source
    remote_calls: AtomicU64,
    /// Lookups served from the cache
    cache_hits: AtomicU64,
    /// Lookups that had to fetch
    cache_misses: AtomicU64,
}

/// Point-in-time copy of [`FetchStats`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FetchStatsSnapshot {
    pub remote_calls: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
}

impl FetchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_remote_call(&self) {
        self.remote_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn remote_calls(&self) -> u64 {
        self.remote_calls.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Get cache hit rate (0.0 - 1.0).
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits();
        let total = hits + self.cache_misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn snapshot(&self) -> FetchStatsSnapshot {
        FetchStatsSnapshot {
            remote_calls: self.remote_calls(),
            cache_hits: self.cache_hits(),
            cache_misses: self.cache_misses(),
            cache_hit_rate: self.cache_hit_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_rate() {
        let stats = FetchStats::new();
        assert_eq!(stats.cache_hit_rate(), 0.0);

        stats.record_cache_hit();
        stats.record_cache_hit();
        stats.record_cache_hit();
        stats.record_cache_miss();

        assert!((stats.cache_hit_rate() - 0.75).abs() < 0.01);
    }

    #[test]
    fn test_snapshot() {
        let stats = FetchStats::new();
        stats.record_remote_call();
        stats.record_cache_miss();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.remote_calls, 1);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.cache_hits, 0);
    }
}
