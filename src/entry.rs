//! Cache entry with metadata for TTL and recency tracking.

use bytes::Bytes;
use std::time::Duration;
use tokio::time::Instant;

/// A single generic cache entry containing the serialized value and metadata.
///
/// Each entry tracks:
/// - The stored value, already serialized
/// - Its TTL and the instant it expires, fixed when written
/// - When it was last read and how many times (for batch eviction)
#[derive(Debug, Clone)]
pub struct Entry {
    /// The serialized value.
    pub(crate) value: Bytes,

    /// TTL this entry was written with.
    pub(crate) ttl: Duration,

    pub(crate) created_at: Instant,
    pub(crate) updated_at: Instant,

    /// `created_at + ttl`.
    pub(crate) expires_at: Instant,

    /// When this entry was last accessed (for eviction ordering).
    pub(crate) last_accessed: Instant,

    /// Number of reads plus the write that created it.
    pub(crate) access_count: u64,
}

/// Metadata of a generic entry, relative to the moment it was inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    /// TTL the entry was written with.
    pub ttl: Duration,
    /// Time since the entry was created.
    pub age: Duration,
    /// Time since the entry was last written.
    pub since_update: Duration,
    /// Time until expiry, `None` once the entry has expired.
    pub expires_in: Option<Duration>,
    /// Time since the entry was last read.
    pub idle: Duration,
    pub access_count: u64,
}

impl Entry {
    /// Create a new entry written at `now`.
    pub fn new_at(value: Bytes, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            ttl,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
            last_accessed: now,
            access_count: 1,
        }
    }

    /// Check if this entry is live at a given time.
    pub fn is_live_at(&self, now: Instant) -> bool {
        self.expires_at > now
    }

    /// Check if this entry has logically expired at a given time.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        !self.is_live_at(now)
    }

    /// Whether the sweep should physically remove this entry.
    ///
    /// Strictly past expiry, so an entry expiring exactly at a tick
    /// survives until the next one.
    pub fn is_sweepable_at(&self, now: Instant) -> bool {
        self.expires_at < now
    }

    /// Record a read at `now`.
    pub fn touch_at(&mut self, now: Instant) {
        self.last_accessed = now;
        self.access_count += 1;
    }

    /// Describe this entry as seen at `now`.
    pub fn info_at(&self, now: Instant) -> EntryInfo {
        EntryInfo {
            ttl: self.ttl,
            age: now.saturating_duration_since(self.created_at),
            since_update: now.saturating_duration_since(self.updated_at),
            expires_in: if self.is_live_at(now) {
                Some(self.expires_at - now)
            } else {
                None
            },
            idle: now.saturating_duration_since(self.last_accessed),
            access_count: self.access_count,
        }
    }
}
