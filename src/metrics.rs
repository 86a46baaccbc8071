//! Typed metric records held by the specialized views.
//!
//! Callers hand in the numeric fields (`VolumeData`, `UserMetricsData`,
//! `AggregatedData`); the cache stamps them with wall-clock timestamps and
//! stores the full record (`VolumeEntry`, `UserMetricsEntry`,
//! `AggregatedMetrics`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Trading volume for a single pool.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VolumeData {
    pub volume_24h: f64,
    pub volume_7d: f64,
    pub volume_30d: f64,
    /// Share of volume held by the largest participants, 0.0 to 1.0.
    pub concentration_risk: f64,
}

/// User activity for a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UserMetricsData {
    pub unique_users_24h: u64,
    pub unique_users_7d: u64,
    pub unique_users_30d: u64,
    pub active_wallets: u64,
    pub new_users: u64,
    /// Fraction of last period's users seen again.
    pub user_retention: f64,
}

/// Chain-wide totals across all tracked protocols.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedData {
    pub total_volume_24h: f64,
    pub total_volume_7d: f64,
    pub total_volume_30d: f64,
    pub total_users_24h: u64,
    pub total_users_7d: u64,
    pub total_users_30d: u64,
    pub protocol_count: u32,
}

/// A cached volume record, keyed by `protocol:pool`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeEntry {
    pub protocol: String,
    pub pool: String,
    pub volume_24h: f64,
    pub volume_7d: f64,
    pub volume_30d: f64,
    pub concentration_risk: f64,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cached user-activity record, keyed by protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMetricsEntry {
    pub protocol: String,
    pub unique_users_24h: u64,
    pub unique_users_7d: u64,
    pub unique_users_30d: u64,
    pub active_wallets: u64,
    pub new_users: u64,
    pub user_retention: f64,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cached chain-wide totals, keyed by chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub chain: String,
    pub total_volume_24h: f64,
    pub total_volume_7d: f64,
    pub total_volume_30d: f64,
    pub total_users_24h: u64,
    pub total_users_7d: u64,
    pub total_users_30d: u64,
    pub protocol_count: u32,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Key of a volume record.
///
/// The join is ambiguous when either part contains `:`, so `("a:b", "c")`
/// and `("a", "b:c")` share a slot and the later write replaces the earlier.
/// Readers check the stored `protocol` and `pool` against their query.
pub(crate) fn volume_key(protocol: &str, pool: &str) -> String {
    format!("{}:{}", protocol, pool)
}

fn ensure_finite(field: &str, value: f64) -> CacheResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CacheError::InvalidValue(format!(
            "{} must be finite, got {}",
            field, value
        )))
    }
}

impl VolumeData {
    pub(crate) fn validate(&self) -> CacheResult<()> {
        ensure_finite("volume_24h", self.volume_24h)?;
        ensure_finite("volume_7d", self.volume_7d)?;
        ensure_finite("volume_30d", self.volume_30d)?;
        ensure_finite("concentration_risk", self.concentration_risk)
    }

    pub(crate) fn into_entry(self, protocol: &str, pool: &str, now: DateTime<Utc>) -> VolumeEntry {
        VolumeEntry {
            protocol: protocol.to_string(),
            pool: pool.to_string(),
            volume_24h: self.volume_24h,
            volume_7d: self.volume_7d,
            volume_30d: self.volume_30d,
            concentration_risk: self.concentration_risk,
            timestamp: now,
            created_at: now,
            updated_at: now,
        }
    }
}

impl UserMetricsData {
    pub(crate) fn validate(&self) -> CacheResult<()> {
        ensure_finite("user_retention", self.user_retention)
    }

    pub(crate) fn into_entry(self, protocol: &str, now: DateTime<Utc>) -> UserMetricsEntry {
        UserMetricsEntry {
            protocol: protocol.to_string(),
            unique_users_24h: self.unique_users_24h,
            unique_users_7d: self.unique_users_7d,
            unique_users_30d: self.unique_users_30d,
            active_wallets: self.active_wallets,
            new_users: self.new_users,
            user_retention: self.user_retention,
            timestamp: now,
            created_at: now,
            updated_at: now,
        }
    }
}

impl AggregatedData {
    pub(crate) fn validate(&self) -> CacheResult<()> {
        ensure_finite("total_volume_24h", self.total_volume_24h)?;
        ensure_finite("total_volume_7d", self.total_volume_7d)?;
        ensure_finite("total_volume_30d", self.total_volume_30d)
    }

    pub(crate) fn into_entry(self, chain: &str, now: DateTime<Utc>) -> AggregatedMetrics {
        AggregatedMetrics {
            chain: chain.to_string(),
            total_volume_24h: self.total_volume_24h,
            total_volume_7d: self.total_volume_7d,
            total_volume_30d: self.total_volume_30d,
            total_users_24h: self.total_users_24h,
            total_users_7d: self.total_users_7d,
            total_users_30d: self.total_users_30d,
            protocol_count: self.protocol_count,
            timestamp: now,
            created_at: now,
            updated_at: now,
        }
    }
}

impl VolumeEntry {
    /// The numeric fields this record was built from.
    pub fn data(&self) -> VolumeData {
        VolumeData {
            volume_24h: self.volume_24h,
            volume_7d: self.volume_7d,
            volume_30d: self.volume_30d,
            concentration_risk: self.concentration_risk,
        }
    }
}

impl UserMetricsEntry {
    /// The numeric fields this record was built from.
    pub fn data(&self) -> UserMetricsData {
        UserMetricsData {
            unique_users_24h: self.unique_users_24h,
            unique_users_7d: self.unique_users_7d,
            unique_users_30d: self.unique_users_30d,
            active_wallets: self.active_wallets,
            new_users: self.new_users,
            user_retention: self.user_retention,
        }
    }
}

impl AggregatedMetrics {
    /// The numeric fields this record was built from.
    pub fn data(&self) -> AggregatedData {
        AggregatedData {
            total_volume_24h: self.total_volume_24h,
            total_volume_7d: self.total_volume_7d,
            total_volume_30d: self.total_volume_30d,
            total_users_24h: self.total_users_24h,
            total_users_7d: self.total_users_7d,
            total_users_30d: self.total_users_30d,
            protocol_count: self.protocol_count,
        }
    }
}
