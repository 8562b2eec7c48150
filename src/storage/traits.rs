//! Storage traits and error types
//!
//! This module defines the trait interface for cache backends and
//! associated error types.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned: {0}")]
    Lock(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Longest retention a cache entry can be given
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Trait for cache backend implementations
///
/// Values are opaque strings (JSON in practice). Implementations must be
/// safe to share across tasks; calls are short and never held across an
/// await point.
pub trait CacheStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent or expired
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key` for `ttl`, replacing any previous value
    fn set(&self, key: &str, value: &str, ttl: Duration) -> StorageResult<()>;

    /// Deletes expired entries
    ///
    /// # Returns
    ///
    /// The number of entries removed
    fn purge_expired(&self) -> StorageResult<usize>;
}

/// Expiry instant for an entry written now with `ttl`
///
/// TTLs beyond a century are clamped.
pub fn expiry_after(ttl: Duration) -> DateTime<Utc> {
    let now = Utc::now();
    chrono::Duration::from_std(ttl.min(MAX_TTL))
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_after_is_in_future() {
        let expiry = expiry_after(Duration::from_secs(3600));
        let delta = expiry - Utc::now();
        assert!(delta > chrono::Duration::minutes(59));
        assert!(delta <= chrono::Duration::hours(1));
    }

    #[test]
    fn test_expiry_after_clamps_huge_ttl() {
        let expiry = expiry_after(Duration::from_secs(u64::MAX));
        assert!(expiry > Utc::now() + chrono::Duration::days(365 * 99));
    }
}
