//! Configuration for the metrics cache.
//!
//! This module provides a builder for configuring expiry, capacity and
//! cleanup behavior. The same settings can be deserialized from any serde
//! format using millisecond fields, so hosts can keep them in their own
//! config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time-to-live for generic entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default capacity bound for the generic store.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Default period of the background sweep.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for creating a new cache instance.
///
/// Use the builder pattern to construct configuration:
///
/// ```
/// use metrics_cache::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::new()
///     .max_entries(5_000)
///     .default_ttl(Duration::from_secs(120))
///     .cleanup_interval(Duration::from_secs(30))
///     .build();
///
/// assert_eq!(config.get_max_entries(), Some(5_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigFile", into = "ConfigFile")]
pub struct CacheConfig {
    /// Expiry applied when `set` is called without an explicit TTL.
    pub(crate) default_ttl: Duration,

    /// Capacity bound that triggers pruning. `None` means unlimited.
    pub(crate) max_entries: Option<usize>,

    /// Period of the background sweep. `None` disables the scheduler.
    pub(crate) cleanup_interval: Option<Duration>,

    /// Whether hit/miss and operation counters are recorded.
    pub(crate) enable_stats: bool,

    /// Optional expiry for the typed metric views. `None` keeps typed
    /// records for the lifetime of the store.
    pub(crate) typed_view_ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            max_entries: Some(DEFAULT_MAX_ENTRIES),
            cleanup_interval: Some(DEFAULT_CLEANUP_INTERVAL),
            enable_stats: true,
            typed_view_ttl: None,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL used by `set` when no explicit TTL is given.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the capacity bound of the generic store.
    ///
    /// Once the store holds more than `max` entries, the least recently
    /// accessed tenth of `max` is evicted in one batch.
    ///
    /// # Arguments
    /// * `max` - Maximum number of entries. Use 0 for unlimited.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = if max == 0 { None } else { Some(max) };
        self
    }

    /// Set the interval of the background sweep.
    ///
    /// Use `Duration::ZERO` to disable the scheduler; expired entries are
    /// then hidden from reads but only removed by `cleanup_expired`.
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = if interval.is_zero() {
            None
        } else {
            Some(interval)
        };
        self
    }

    /// Enable or disable hit/miss and operation counters.
    pub fn enable_stats(mut self, enabled: bool) -> Self {
        self.enable_stats = enabled;
        self
    }

    /// Give the typed metric views an expiry.
    ///
    /// Use `Duration::ZERO` to keep typed records until overwritten or cleared.
    pub fn typed_view_ttl(mut self, ttl: Duration) -> Self {
        self.typed_view_ttl = if ttl.is_zero() { None } else { Some(ttl) };
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Self {
        self
    }

    /// Get the default TTL.
    pub fn get_default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get the capacity bound, if set.
    pub fn get_max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Get the sweep interval, if the scheduler is enabled.
    pub fn get_cleanup_interval(&self) -> Option<Duration> {
        self.cleanup_interval
    }

    /// Whether statistics counters are recorded.
    pub fn stats_enabled(&self) -> bool {
        self.enable_stats
    }

    /// Get the typed view TTL, if set.
    pub fn get_typed_view_ttl(&self) -> Option<Duration> {
        self.typed_view_ttl
    }
}

/// Serialized form of [`CacheConfig`]. Every field is optional and durations
/// are whole milliseconds; a zero disables the same things the builder does.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub default_ttl_ms: Option<u64>,
    pub max_entries: Option<usize>,
    pub cleanup_interval_ms: Option<u64>,
    pub enable_stats: Option<bool>,
    pub typed_view_ttl_ms: Option<u64>,
}

fn millis(d: Duration) -> u64 {
    d.as_millis().try_into().unwrap_or(u64::MAX)
}

impl From<CacheConfig> for ConfigFile {
    fn from(config: CacheConfig) -> Self {
        Self {
            default_ttl_ms: Some(millis(config.default_ttl)),
            max_entries: Some(config.max_entries.unwrap_or(0)),
            cleanup_interval_ms: Some(config.cleanup_interval.map_or(0, millis)),
            enable_stats: Some(config.enable_stats),
            typed_view_ttl_ms: Some(config.typed_view_ttl.map_or(0, millis)),
        }
    }
}

impl From<ConfigFile> for CacheConfig {
    fn from(file: ConfigFile) -> Self {
        let mut config = CacheConfig::default();
        if let Some(ms) = file.default_ttl_ms {
            config = config.default_ttl(Duration::from_millis(ms));
        }
        if let Some(max) = file.max_entries {
            config = config.max_entries(max);
        }
        if let Some(ms) = file.cleanup_interval_ms {
            config = config.cleanup_interval(Duration::from_millis(ms));
        }
        if let Some(enabled) = file.enable_stats {
            config = config.enable_stats(enabled);
        }
        if let Some(ms) = file.typed_view_ttl_ms {
            config = config.typed_view_ttl(Duration::from_millis(ms));
        }
        config
    }
}
