//! Get-or-compute cache service
//!
//! [`ComputeCache::try_get`] returns the cached value for a key or runs the
//! supplied computation and stores its result. Within one process at most one
//! computation per key is in flight: later callers for the same key wait on a
//! per-key lock and then read what the first caller stored.
//!
//! The store is best effort. Read, write, and decode failures are logged and
//! the value is computed without caching; only computation failures reach the
//! caller.

use crate::storage::traits::CacheStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type KeyLock = Arc<tokio::sync::Mutex<()>>;

/// Shared get-or-compute cache over a [`CacheStore`]
pub struct ComputeCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    locks: Mutex<HashMap<String, KeyLock>>,
}

impl ComputeCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, computing and storing it on a miss
    ///
    /// # Arguments
    ///
    /// * `key` - Cache key
    /// * `compute` - Produces the value on a miss; not called on a hit
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - The cached or freshly computed value
    /// * `Err(E)` - `compute` failed; nothing was stored
    pub async fn try_get<T, E, F, Fut>(&self, key: &str, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let lock = self.key_lock(key);

        let result = {
            let _guard = lock.lock().await;

            match self.lookup(key) {
                Some(hit) => {
                    tracing::debug!("Cache hit for {}", key);
                    Ok(hit)
                }
                None => {
                    tracing::debug!("Cache miss for {}", key);
                    let computed = compute().await;
                    if let Ok(value) = &computed {
                        self.save(key, value);
                    }
                    computed
                }
            }
        };

        self.release(key, &lock);
        result
    }

    fn key_lock(&self, key: &str) -> KeyLock {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    /// Drops the key's lock once no other caller holds or awaits it
    fn release(&self, key: &str, lock: &KeyLock) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the map plus ours
        if Arc::strong_count(lock) <= 2 {
            locks.remove(key);
        }
    }

    fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry for {}: {}", key, e);
                None
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to encode cache entry for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(key, &raw, self.ttl) {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }
    }
}
