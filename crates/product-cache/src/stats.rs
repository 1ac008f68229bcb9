//! Cache counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct CacheStats {
    /// Lookups answered from a fresh entry.
    pub hits: AtomicU64,
    /// Lookups that needed a refresh, whether they led it or waited on it.
    pub misses: AtomicU64,
    /// Misses that joined a refresh already in flight.
    pub coalesced: AtomicU64,
    /// Refreshes started.
    pub refreshes: AtomicU64,
    /// Refreshes that ended in a fetch or decode error.
    pub refresh_failures: AtomicU64,
}

impl CacheStats {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        self.snapshot(0).hit_rate()
    }

    pub fn snapshot(&self, entries: usize) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
            entries,
        }
    }
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub refreshes: u64,
    pub refresh_failures: u64,
    pub entries: usize,
}

impl CacheStatsSnapshot {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats::default();
        assert_eq!(stats.snapshot(0).hit_rate(), 0.0);

        for _ in 0..3 {
            CacheStats::bump(&stats.hits);
        }
        CacheStats::bump(&stats.misses);
        let snapshot = stats.snapshot(1);
        assert_eq!(snapshot.hits, 3);
        assert!((snapshot.hit_rate() - 75.0).abs() < f64::EPSILON);
    }
}
