//! Error types for the metrics cache.
//!
//! Write paths fail loud and return a [`CacheError`]. Read paths never do:
//! a value that cannot be decoded is logged and reported as a miss.

use thiserror::Error;

/// The main error type for cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The value could not be serialized into the cache.
    ///
    /// Returned from `set` when the value has no plain-data representation,
    /// for example a map keyed by tuples.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The provided value is invalid (non-finite metric, etc.).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A lock could not be acquired (poisoned lock).
    #[error("lock error: {0}")]
    LockError(String),

    /// A cleanup interval was configured but no tokio runtime is running.
    #[error("no tokio runtime available to run the cleanup scheduler")]
    NoRuntime,
}

/// A specialized Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
