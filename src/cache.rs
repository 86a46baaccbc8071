//! The main cache interface.
//!
//! This module provides the primary `CacheStore` type that users interact
//! with. It wraps the internal storage and the sweep scheduler behind a
//! cheap, cloneable handle.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::entry::EntryInfo;
use crate::error::CacheResult;
use crate::metrics::{
    AggregatedData, AggregatedMetrics, UserMetricsData, UserMetricsEntry, VolumeData, VolumeEntry,
};
use crate::scheduler::Sweeper;
use crate::stats::{CacheStats, StatsSnapshot};
use crate::storage::Db;

/// A thread-safe, time-bounded cache for dashboard metrics.
///
/// # Features
/// - **Generic entries**: any `Serialize` value under a string key, with a TTL.
/// - **Batch eviction**: when over `max_entries`, the least recently accessed
///   tenth of the capacity is evicted.
/// - **Background sweep**: a tokio task removes expired entries periodically.
/// - **Typed views**: volume, user-metrics and aggregated records in their own
///   namespaces.
/// - **Statistics**: hits, misses, sizes and more via [`CacheStore::stats`].
///
/// Cloning a `CacheStore` creates a new handle to the same cache.
///
/// # Example
/// ```
/// use metrics_cache::{CacheConfig, CacheStore};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), metrics_cache::CacheError> {
/// let config = CacheConfig::new()
///     .max_entries(1000)
///     .default_ttl(Duration::from_secs(300))
///     .build();
///
/// let cache = CacheStore::new(config)?;
///
/// cache.set("pools:top", &vec!["eth-usdc", "wbtc-eth"])?;
/// let pools: Option<Vec<String>> = cache.get("pools:top");
/// assert_eq!(pools.map(|p| p.len()), Some(2));
///
/// cache.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Internal storage.
    db: Arc<Db>,

    /// Background sweep task, shared by every handle.
    sweeper: Arc<Sweeper>,
}

impl CacheStore {
    /// Create a new cache with the given configuration.
    ///
    /// Starts the background sweep when a cleanup interval is configured,
    /// which requires a running tokio runtime. With the interval set to zero
    /// the cache can be built anywhere.
    ///
    /// # Errors
    /// [`CacheError::NoRuntime`](crate::CacheError::NoRuntime) if a sweep is
    /// configured but no runtime is running.
    ///
    /// # Example
    /// ```
    /// use metrics_cache::{CacheConfig, CacheStore};
    /// use std::time::Duration;
    ///
    /// let config = CacheConfig::new().cleanup_interval(Duration::ZERO);
    /// let cache = CacheStore::new(config).unwrap();
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(config: CacheConfig) -> CacheResult<Self> {
        let interval = config.cleanup_interval;
        let db = Arc::new(Db::new(config));
        let sweeper = match interval {
            Some(period) => Sweeper::start(&db, period)?,
            None => Sweeper::disabled(),
        };

        Ok(Self {
            db,
            sweeper: Arc::new(sweeper),
        })
    }

    /// Get a copy of a live value.
    ///
    /// Returns `None` if the key doesn't exist, has expired, or holds a value
    /// that cannot be decoded as `T`. A hit refreshes the entry's recency.
    ///
    /// # Example
    /// ```
    /// use metrics_cache::{CacheConfig, CacheStore};
    /// use std::time::Duration;
    ///
    /// let cache = CacheStore::new(CacheConfig::new().cleanup_interval(Duration::ZERO)).unwrap();
    /// cache.set("tvl", &1_250_000u64).unwrap();
    ///
    /// assert_eq!(cache.get::<u64>("tvl"), Some(1_250_000));
    /// assert_eq!(cache.get::<u64>("missing"), None);
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.db.get(key)
    }

    /// Store a value with the configured default TTL.
    ///
    /// # Errors
    /// [`CacheError::Serialization`](crate::CacheError::Serialization) if the
    /// value has no plain-data representation, including any NaN or infinite
    /// float inside it.
    pub fn set<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> CacheResult<()> {
        self.db.set(key.into(), value, self.db.config().default_ttl)
    }

    /// Store a value with a specific TTL.
    ///
    /// # Example
    /// ```
    /// use metrics_cache::{CacheConfig, CacheStore};
    /// use std::time::Duration;
    ///
    /// let cache = CacheStore::new(CacheConfig::new().cleanup_interval(Duration::ZERO)).unwrap();
    /// cache.set_with_ttl("price:eth", &3150.25, Duration::from_secs(15)).unwrap();
    /// assert!(cache.contains("price:eth"));
    /// ```
    pub fn set_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: impl Into<String>,
        value: &T,
        ttl: Duration,
    ) -> CacheResult<()> {
        self.db.set(key.into(), value, ttl)
    }

    /// Delete a key from the generic store.
    ///
    /// Returns `true` if the key existed and was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.db.delete(key)
    }

    /// Check if a key exists and has not expired.
    ///
    /// Note: This does NOT count as a hit or refresh recency.
    pub fn contains(&self, key: &str) -> bool {
        self.db.contains(key)
    }

    /// Inspect the metadata of a generic entry without reading it.
    pub fn entry_info(&self, key: &str) -> Option<EntryInfo> {
        self.db.entry_info(key)
    }

    /// Get the number of generic entries.
    ///
    /// Note: This includes expired entries that the sweep has not removed yet.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Remove everything: generic entries and all typed records.
    ///
    /// Hit and miss counters are kept.
    pub fn clear(&self) {
        self.db.clear();
    }

    /// Manually remove expired entries.
    ///
    /// Returns the number of generic entries removed. Works whether or not
    /// the background sweep is running.
    pub fn cleanup_expired(&self) -> usize {
        self.db.cleanup_expired()
    }

    /// Store the volume figures of `pool` on `protocol`.
    pub fn set_volume_data(&self, protocol: &str, pool: &str, data: VolumeData) -> CacheResult<()> {
        self.db.set_volume_data(protocol, pool, data)
    }

    pub fn get_volume_data(&self, protocol: &str, pool: &str) -> Option<VolumeEntry> {
        self.db.get_volume_data(protocol, pool)
    }

    /// Store the user activity of `protocol`.
    pub fn set_user_metrics(&self, protocol: &str, data: UserMetricsData) -> CacheResult<()> {
        self.db.set_user_metrics(protocol, data)
    }

    pub fn get_user_metrics(&self, protocol: &str) -> Option<UserMetricsEntry> {
        self.db.get_user_metrics(protocol)
    }

    /// Store the chain-wide totals of `chain`.
    pub fn set_aggregated_metrics(&self, chain: &str, data: AggregatedData) -> CacheResult<()> {
        self.db.set_aggregated_metrics(chain, data)
    }

    pub fn get_aggregated_metrics(&self, chain: &str) -> Option<AggregatedMetrics> {
        self.db.get_aggregated_metrics(chain)
    }

    /// Get a snapshot of the cache statistics.
    ///
    /// Sizes come from a scan of the store at call time, so `expired_entries`
    /// counts entries past expiry that the sweep has not reached yet.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::new(self.db.sizes(), &self.db.stats())
    }

    /// Get a reference to the internal statistics counters.
    ///
    /// This is useful for integrating with external metrics systems.
    pub fn stats_ref(&self) -> Arc<CacheStats> {
        self.db.stats()
    }

    /// Get the configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        self.db.config()
    }

    /// Stop the background sweep.
    ///
    /// Once this returns, no sweep-driven removal will happen again. Calling
    /// it more than once is harmless. The cache stays usable.
    pub fn close(&self) {
        self.db.halt_sweeps();
        self.sweeper.stop();
    }
}
