//! Internal storage implementation for the cache.
//!
//! All four maps (the generic store and the three typed views) sit behind a
//! single `RwLock`, so every public operation, including the prune that
//! follows a write and each sweep pass, is one indivisible unit.

use chrono::Utc;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::codec;
use crate::config::CacheConfig;
use crate::entry::{Entry, EntryInfo};
use crate::error::{CacheError, CacheResult};
use crate::metrics::{
    volume_key, AggregatedData, AggregatedMetrics, UserMetricsData, UserMetricsEntry, VolumeData,
    VolumeEntry,
};
use crate::stats::{CacheStats, StoreSizes};

/// A prune removes `ceil(max_entries / PRUNE_DIVISOR)` entries.
const PRUNE_DIVISOR: usize = 10;

/// A typed record plus its optional expiry.
#[derive(Debug, Clone)]
struct Typed<R> {
    record: R,
    expires_at: Option<Instant>,
}

impl<R: Clone> Typed<R> {
    fn live_at(&self, now: Instant) -> Option<R> {
        match self.expires_at {
            Some(at) if at <= now => None,
            _ => Some(self.record.clone()),
        }
    }

    fn is_sweepable_at(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at < now)
    }
}

/// Everything guarded by the store lock.
#[derive(Debug, Default)]
struct State {
    /// Insertion order breaks recency ties when pruning.
    entries: IndexMap<String, Entry>,
    volume: HashMap<String, Typed<VolumeEntry>>,
    user_metrics: HashMap<String, Typed<UserMetricsEntry>>,
    aggregated: HashMap<String, Typed<AggregatedMetrics>>,
}

/// Thread-safe store shared by every `CacheStore` handle and the sweeper.
///
/// This is the internal implementation; users should use `CacheStore` instead.
#[derive(Debug)]
pub struct Db {
    state: RwLock<State>,

    /// Configuration for this cache instance.
    config: CacheConfig,

    /// Statistics for cache operations.
    stats: Arc<CacheStats>,

    /// Cleared by `halt_sweeps`; scheduled sweeps check it under the lock.
    sweeps_enabled: AtomicBool,
}

impl Db {
    /// Create a new database with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        let stats = Arc::new(CacheStats::new(config.enable_stats));
        Self {
            state: RwLock::new(State::default()),
            config,
            stats,
            sweeps_enabled: AtomicBool::new(true),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a decoded copy of a live value.
    ///
    /// Returns `None` if the key is absent, expired or cannot be decoded as
    /// `T`. Only a successful decode refreshes the entry's recency. Expired
    /// entries are left in place for the sweep.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let decoded = self.write_lock().and_then(|mut state| {
            let entry = state.entries.get_mut(key)?;
            if !entry.is_live_at(now) {
                return None;
            }
            match codec::decode(&entry.value) {
                Ok(decoded) => {
                    entry.touch_at(now);
                    Some(decoded)
                }
                Err(err) => {
                    warn!(key, error = %err, "cached value could not be decoded, reporting a miss");
                    None
                }
            }
        });

        match decoded {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        decoded
    }

    /// Serialize `value` and store it under `key` for `ttl`.
    ///
    /// Overwrites any previous entry and then prunes if the store is over
    /// capacity. A value holding NaN or an infinity is refused with
    /// `CacheError::Serialization` and leaves the store unchanged.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: String,
        value: &T,
        ttl: Duration,
    ) -> CacheResult<()> {
        let value = codec::encode(value)?;
        let now = Instant::now();

        let mut state = self.write_lock_or_err()?;
        // Re-insert at the back so an overwrite counts as the newest entry.
        state.entries.shift_remove(&key);
        state.entries.insert(key, Entry::new_at(value, ttl, now));
        self.stats.record_set();

        self.prune(&mut state.entries);
        Ok(())
    }

    /// Delete a key from the generic store.
    ///
    /// Returns `true` if the key existed and was removed.
    pub fn delete(&self, key: &str) -> bool {
        let mut state = match self.write_lock() {
            Some(s) => s,
            None => return false,
        };

        let existed = state.entries.shift_remove(key).is_some();
        if existed {
            self.stats.record_delete();
        }
        existed
    }

    /// Check if a key is present and live, without touching it.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.read_lock()
            .and_then(|state| state.entries.get(key).map(|e| e.is_live_at(now)))
            .unwrap_or(false)
    }

    /// Metadata of a generic entry, live or expired-unswept.
    pub fn entry_info(&self, key: &str) -> Option<EntryInfo> {
        let now = Instant::now();
        let state = self.read_lock()?;
        state.entries.get(key).map(|e| e.info_at(now))
    }

    /// Number of generic entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.read_lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty the generic store and all typed views. Counters are kept.
    pub fn clear(&self) {
        if let Some(mut state) = self.write_lock() {
            state.entries.clear();
            state.volume.clear();
            state.user_metrics.clear();
            state.aggregated.clear();
        }
    }

    /// Get a reference to the statistics.
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Scan the store for the size figures of a stats snapshot.
    pub(crate) fn sizes(&self) -> StoreSizes {
        let now = Instant::now();
        let Some(state) = self.read_lock() else {
            return StoreSizes {
                average_ttl: self.config.default_ttl,
                ..Default::default()
            };
        };

        let total_entries = state.entries.len();
        let expired_entries = state
            .entries
            .values()
            .filter(|e| e.is_expired_at(now))
            .count();
        let average_ttl = if total_entries == 0 {
            self.config.default_ttl
        } else {
            let total: u128 = state.entries.values().map(|e| e.ttl.as_nanos()).sum();
            let mean = total / total_entries as u128;
            Duration::from_nanos(u64::try_from(mean).unwrap_or(u64::MAX))
        };

        StoreSizes {
            total_entries,
            expired_entries,
            volume_entries: state.volume.len(),
            user_metrics_entries: state.user_metrics.len(),
            aggregated_entries: state.aggregated.len(),
            average_ttl,
        }
    }

    /// Remove every expired entry now, regardless of the scheduler.
    ///
    /// Returns the number of generic entries removed.
    pub fn cleanup_expired(&self) -> usize {
        match self.write_lock() {
            Some(mut state) => self.sweep(&mut state, Instant::now()),
            None => 0,
        }
    }

    /// One scheduled sweep pass. Returns `None` once sweeps are halted.
    pub(crate) fn scheduled_sweep(&self) -> Option<usize> {
        let mut state = self.write_lock()?;
        if !self.sweeps_enabled.load(Ordering::Acquire) {
            return None;
        }
        Some(self.sweep(&mut state, Instant::now()))
    }

    /// Stop scheduled sweeps from removing anything.
    ///
    /// Returns only once no scheduled sweep is mid-pass.
    pub(crate) fn halt_sweeps(&self) {
        self.sweeps_enabled.store(false, Ordering::Release);
        drop(self.write_lock());
    }

    // Typed views

    pub fn set_volume_data(&self, protocol: &str, pool: &str, data: VolumeData) -> CacheResult<()> {
        data.validate()?;
        let record = self.typed(data.into_entry(protocol, pool, Utc::now()));
        let mut state = self.write_lock_or_err()?;
        state.volume.insert(volume_key(protocol, pool), record);
        Ok(())
    }

    /// Only a record written for exactly this `protocol` and `pool` is
    /// returned, even when another pair joins to the same key.
    pub fn get_volume_data(&self, protocol: &str, pool: &str) -> Option<VolumeEntry> {
        let now = Instant::now();
        let state = self.read_lock()?;
        state
            .volume
            .get(&volume_key(protocol, pool))?
            .live_at(now)
            .filter(|record| record.protocol == protocol && record.pool == pool)
    }

    pub fn set_user_metrics(&self, protocol: &str, data: UserMetricsData) -> CacheResult<()> {
        data.validate()?;
        let record = self.typed(data.into_entry(protocol, Utc::now()));
        let mut state = self.write_lock_or_err()?;
        state.user_metrics.insert(protocol.to_string(), record);
        Ok(())
    }

    pub fn get_user_metrics(&self, protocol: &str) -> Option<UserMetricsEntry> {
        let now = Instant::now();
        let state = self.read_lock()?;
        state.user_metrics.get(protocol)?.live_at(now)
    }

    pub fn set_aggregated_metrics(&self, chain: &str, data: AggregatedData) -> CacheResult<()> {
        data.validate()?;
        let record = self.typed(data.into_entry(chain, Utc::now()));
        let mut state = self.write_lock_or_err()?;
        state.aggregated.insert(chain.to_string(), record);
        Ok(())
    }

    pub fn get_aggregated_metrics(&self, chain: &str) -> Option<AggregatedMetrics> {
        let now = Instant::now();
        let state = self.read_lock()?;
        state.aggregated.get(chain)?.live_at(now)
    }

    // Private helper methods

    /// Acquire a read lock, returning None if poisoned.
    fn read_lock(&self) -> Option<RwLockReadGuard<'_, State>> {
        match self.state.read() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("cache lock poisoned");
                None
            }
        }
    }

    /// Acquire a write lock, returning None if poisoned.
    fn write_lock(&self) -> Option<RwLockWriteGuard<'_, State>> {
        match self.state.write() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("cache lock poisoned");
                None
            }
        }
    }

    fn write_lock_or_err(&self) -> CacheResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|err| CacheError::LockError(err.to_string()))
    }

    fn typed<R>(&self, record: R) -> Typed<R> {
        Typed {
            record,
            expires_at: self.config.typed_view_ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    /// Evict a batch of the least recently accessed entries if over capacity.
    fn prune(&self, entries: &mut IndexMap<String, Entry>) {
        let Some(max_entries) = self.config.max_entries else {
            return;
        };
        if entries.len() <= max_entries {
            return;
        }
        let batch = max_entries.div_ceil(PRUNE_DIVISOR);
        if batch == 0 {
            return;
        }

        // Stable sort keeps insertion order among equal timestamps.
        let mut by_recency: Vec<(usize, Instant)> = entries
            .values()
            .map(|e| e.last_accessed)
            .enumerate()
            .collect();
        by_recency.sort_by_key(|&(_, accessed)| accessed);

        let mut evict = vec![false; entries.len()];
        for &(index, _) in by_recency.iter().take(batch) {
            evict[index] = true;
        }

        let mut index = 0;
        entries.retain(|_, _| {
            let keep = !evict[index];
            index += 1;
            keep
        });

        self.stats.record_evictions(batch as u64);
        debug!(evicted = batch, max_entries, "pruned least recently accessed entries");
    }

    /// Remove expired entries from every swept map.
    fn sweep(&self, state: &mut State, now: Instant) -> usize {
        let before = state.entries.len();
        state.entries.retain(|_, e| !e.is_sweepable_at(now));
        let removed = before - state.entries.len();

        let typed_before = state.volume.len() + state.user_metrics.len() + state.aggregated.len();
        if self.config.typed_view_ttl.is_some() {
            state.volume.retain(|_, t| !t.is_sweepable_at(now));
            state.user_metrics.retain(|_, t| !t.is_sweepable_at(now));
            state.aggregated.retain(|_, t| !t.is_sweepable_at(now));
        }
        let typed_removed = typed_before
            - (state.volume.len() + state.user_metrics.len() + state.aggregated.len());

        if removed > 0 || typed_removed > 0 {
            self.stats.record_expirations(removed as u64);
            debug!(
                removed,
                typed_removed,
                remaining = state.entries.len(),
                "swept expired entries"
            );
        }
        removed
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
