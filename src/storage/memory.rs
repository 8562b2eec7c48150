//! In-process cache store
//!
//! Entries live only as long as the process. Useful for one-shot runs and
//! for tests.

use crate::storage::traits::{expiry_after, CacheStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Process-local cache backend
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> StorageResult<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let now = Utc::now();
        let entries = self.entries()?;

        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> StorageResult<()> {
        self.entries()?.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: expiry_after(ttl),
            },
        );
        Ok(())
    }

    fn purge_expired(&self) -> StorageResult<usize> {
        let now = Utc::now();
        let mut entries = self.entries()?;

        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok(before - entries.len())
    }
}
