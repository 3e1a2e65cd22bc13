//! Cache accounting
//!
//! Lifetime hit/miss counters and the snapshot type handed out for
//! diagnostics. Counters are atomics so lookups never contend on a lock just
//! to bump a number.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Snapshot of cache accounting at one point in time.
///
/// Counters accumulate over the cache's lifetime (or since the last clear);
/// they are never windowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Current number of live entries.
    pub size: usize,
}

impl CacheStats {
    /// Hit rate over all recorded lookups; 0 when nothing has been looked up
    /// yet.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total number of lookups (hits + misses).
    #[must_use]
    pub const fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Thread-safe hit/miss collector.
#[derive(Debug, Default)]
pub(crate) struct StatsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl StatsCollector {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Current statistics snapshot.
    pub(crate) fn snapshot(&self, size: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size,
        }
    }

    /// Reset both counters to zero.
    pub(crate) fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
