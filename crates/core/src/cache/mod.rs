//! Context cache - memoized generation context per subject
//!
//! Assembling the side context for a generation task (project text, character
//! and world summaries) is expensive; this cache memoizes the result per
//! subject (project id), keyed by a content hash so any change to the inputs
//! reads as a miss. Bounded capacity with insertion-order eviction, lazy TTL
//! expiry on lookup, and lifetime hit/miss accounting.

pub mod stats;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use inkflow_common::time::{Clock, SystemClock};
use inkflow_domain::{CacheSettings, OperationContext};
use parking_lot::Mutex;
use tracing::debug;

pub use stats::CacheStats;
use stats::StatsCollector;

/// One cached context, keyed by subject.
#[derive(Debug, Clone)]
struct CacheEntry {
    subject_id: String,
    payload: OperationContext,
    content_hash: String,
    cached_at: Instant,
}

/// Bounded, TTL-expiring context cache.
///
/// Capacity and TTL are fixed for the process lifetime. All mutation goes
/// through one mutex; hit/miss counters are atomics beside it. Generic over
/// [`Clock`] so TTL behavior is deterministic under test.
pub struct ContextCache<C: Clock = SystemClock> {
    /// Entries in insertion order; the front is the eviction candidate.
    entries: Mutex<VecDeque<CacheEntry>>,
    capacity: usize,
    ttl: Duration,
    stats: StatsCollector,
    clock: C,
}

impl ContextCache {
    /// Cache on the system clock.
    #[must_use]
    pub fn new(settings: &CacheSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> ContextCache<C> {
    /// Cache reading time through the supplied clock.
    ///
    /// A zero capacity is treated as one.
    #[must_use]
    pub fn with_clock(settings: &CacheSettings, clock: C) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: settings.capacity.max(1),
            ttl: settings.ttl(),
            stats: StatsCollector::default(),
            clock,
        }
    }

    /// Upsert the cached context for `subject_id`.
    ///
    /// Re-caching an existing subject counts as a fresh insertion for
    /// eviction ordering. Inserting a new subject at capacity evicts the
    /// oldest entry first, so size never exceeds capacity.
    pub fn set(&self, subject_id: &str, payload: OperationContext, content_hash: &str) {
        let mut entries = self.entries.lock();
        if let Some(pos) = entries.iter().position(|e| e.subject_id == subject_id) {
            entries.remove(pos);
        } else if entries.len() >= self.capacity {
            if let Some(evicted) = entries.pop_front() {
                debug!(subject = %evicted.subject_id, "cache at capacity, evicting oldest entry");
            }
        }
        entries.push_back(CacheEntry {
            subject_id: subject_id.to_string(),
            payload,
            content_hash: content_hash.to_string(),
            cached_at: self.clock.now(),
        });
    }

    /// Look up the cached context for `subject_id`.
    ///
    /// Misses when no entry exists, the entry's TTL has elapsed, or the
    /// stored hash differs from `content_hash`. Expired and stale entries are
    /// evicted as part of the lookup, so the next `set` re-populates cleanly.
    /// A hit returns the payload without touching the entry's hash or
    /// timestamp.
    pub fn get(&self, subject_id: &str, content_hash: &str) -> Option<OperationContext> {
        let mut entries = self.entries.lock();
        let Some(pos) = entries.iter().position(|e| e.subject_id == subject_id) else {
            self.stats.record_miss();
            return None;
        };

        let expired = self.clock.now().duration_since(entries[pos].cached_at) >= self.ttl;
        let stale = !expired && entries[pos].content_hash != content_hash;
        if expired || stale {
            debug!(
                subject = subject_id,
                reason = if expired { "expired" } else { "stale" },
                "evicting cache entry on lookup"
            );
            entries.remove(pos);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        Some(entries[pos].payload.clone())
    }

    /// Drop one subject's entry regardless of TTL or hash state.
    ///
    /// Returns whether an entry was removed. Does not count as a miss.
    pub fn invalidate(&self, subject_id: &str) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|e| e.subject_id == subject_id) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Empty the cache and reset hit/miss accounting.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        self.stats.reset();
    }

    /// Current accounting snapshot.
    pub fn stats(&self) -> CacheStats {
        let size = self.entries.lock().len();
        self.stats.snapshot(size)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
