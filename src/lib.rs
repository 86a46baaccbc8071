//! # Metrics Cache
//!
//! An in-process, time-bounded cache used as the read-through store for
//! computed dashboard metrics: per-pool volume, per-protocol user activity
//! and per-chain aggregates.
//!
//! ## Features
//!
//! - **TTL expiry**: reads never return expired values; a background tokio
//!   task sweeps them out periodically
//! - **Batch eviction**: past `max_entries`, the least recently accessed
//!   tenth of the capacity is evicted in one pass
//! - **Typed views**: volume, user-metrics and aggregated records live in
//!   their own namespaces
//! - **Statistics**: hit rate, sizes, expired-but-unswept entries and more
//! - **Snapshot-safe reads**: values are stored serialized, so every `get`
//!   returns an independent copy
//!
//! ## Quick Start
//!
//! ```rust
//! use metrics_cache::{CacheConfig, CacheStore, VolumeData};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), metrics_cache::CacheError> {
//! let config = CacheConfig::new()
//!     .max_entries(10_000)
//!     .default_ttl(Duration::from_secs(300))
//!     .cleanup_interval(Duration::from_secs(60))
//!     .build();
//!
//! // One instance per process, handed to consumers by clone
//! let cache = CacheStore::new(config)?;
//!
//! cache.set("protocols:active", &vec!["uniswap", "curve"])?;
//! let active: Option<Vec<String>> = cache.get("protocols:active");
//! assert!(active.is_some());
//!
//! cache.set_volume_data(
//!     "uniswap",
//!     "eth-usdc",
//!     VolumeData {
//!         volume_24h: 1.2e6,
//!         volume_7d: 8.1e6,
//!         volume_30d: 3.4e7,
//!         concentration_risk: 0.31,
//!     },
//! )?;
//! assert!(cache.get_volume_data("uniswap", "eth-usdc").is_some());
//!
//! let stats = cache.stats();
//! println!("Hit rate: {:.1}%", stats.hit_rate);
//!
//! cache.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! The cache is safe to share across threads and tasks. Cloning a
//! `CacheStore` creates a new handle to the same underlying data, and every
//! operation runs under a single store lock.

pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod stats;

pub use cache::CacheStore;
pub use config::CacheConfig;
pub use entry::EntryInfo;
pub use error::{CacheError, CacheResult};
pub use metrics::{
    AggregatedData, AggregatedMetrics, UserMetricsData, UserMetricsEntry, VolumeData, VolumeEntry,
};
pub use stats::{CacheStats, StatsSnapshot};

// Internal modules - not part of public API
pub(crate) mod codec;
pub(crate) mod entry;
pub(crate) mod scheduler;
pub(crate) mod storage;

pub mod cli;
pub use cli::{Cli, SimulateCommand};
