//! Statistics and metrics for the cache.
//!
//! This module provides atomic counters for tracking cache operations,
//! and the [`StatsSnapshot`] returned by `CacheStore::stats`.

use serde::{Serialize, Serializer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lifetime counters for cache operations.
///
/// All counters are atomic and can be safely accessed from multiple threads.
/// When disabled, every `record_*` call is a no-op, so the counters stay at
/// zero. Counters are never reset by `clear`.
#[derive(Debug)]
pub struct CacheStats {
    enabled: bool,

    /// Number of generic reads that returned a value.
    hits: AtomicU64,

    /// Number of generic reads that missed (absent, expired or undecodable).
    misses: AtomicU64,

    /// Number of entries evicted by capacity pruning.
    evictions: AtomicU64,

    /// Number of entries removed by the sweep.
    expirations: AtomicU64,

    /// Total number of generic set operations performed.
    sets: AtomicU64,

    /// Total number of deletes that removed an entry.
    deletes: AtomicU64,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CacheStats {
    /// Create a new stats instance with all counters at zero.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn add(&self, counter: &AtomicU64, n: u64) {
        if self.is_enabled() {
            counter.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Record a cache hit.
    pub fn record_hit(&self) {
        self.add(&self.hits, 1);
    }

    /// Record a cache miss.
    pub fn record_miss(&self) {
        self.add(&self.misses, 1);
    }

    /// Record `n` evictions (due to capacity).
    pub fn record_evictions(&self, n: u64) {
        self.add(&self.evictions, n);
    }

    /// Record `n` expirations (removed by the sweep).
    pub fn record_expirations(&self, n: u64) {
        self.add(&self.expirations, n);
    }

    /// Record a set operation.
    pub fn record_set(&self) {
        self.add(&self.sets, 1);
    }

    /// Record a delete operation.
    pub fn record_delete(&self) {
        self.add(&self.deletes, 1);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::Relaxed)
    }

    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Calculate the hit rate as a percentage (0.0 to 100.0).
    /// Returns 0.0 if no reads have been performed.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let misses = self.misses();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// Sizes gathered by scanning the store under its lock.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StoreSizes {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub volume_entries: usize,
    pub user_metrics_entries: usize,
    pub aggregated_entries: usize,
    pub average_ttl: Duration,
}

/// A point-in-time snapshot of cache statistics.
///
/// Sizes reflect the store at the moment of the call; counters are
/// lifetime totals since construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Generic entries physically present, including expired-unswept ones.
    pub total_entries: usize,
    /// Generic entries past their expiry that the sweep has not removed yet.
    pub expired_entries: usize,
    pub volume_entries: usize,
    pub user_metrics_entries: usize,
    pub aggregated_entries: usize,
    /// Mean TTL of the generic entries present, or the default TTL when empty.
    #[serde(rename = "average_ttl_ms", serialize_with = "duration_as_millis")]
    pub average_ttl: Duration,
    pub hit_rate: f64,
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl StatsSnapshot {
    pub(crate) fn new(sizes: StoreSizes, counters: &CacheStats) -> Self {
        Self {
            total_entries: sizes.total_entries,
            expired_entries: sizes.expired_entries,
            volume_entries: sizes.volume_entries,
            user_metrics_entries: sizes.user_metrics_entries,
            aggregated_entries: sizes.aggregated_entries,
            average_ttl: sizes.average_ttl,
            hit_rate: counters.hit_rate(),
            hits: counters.hits(),
            misses: counters.misses(),
            sets: counters.sets(),
            deletes: counters.deletes(),
            evictions: counters.evictions(),
            expirations: counters.expirations(),
        }
    }
}

fn duration_as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
}
