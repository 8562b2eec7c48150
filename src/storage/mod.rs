//! Storage module for the enrichment cache
//!
//! This module handles everything that outlives a single fetch:
//! - The [`CacheStore`] backends (in-process and SQLite)
//! - The SQLite schema
//! - [`ComputeCache`], the get-or-compute service shared by concurrent fetches

mod compute;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use compute::ComputeCache;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{expiry_after, CacheStore, StorageError, StorageResult};

use crate::config::{CacheBackend, CacheConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Opens the cache backend selected by the configuration
///
/// # Arguments
///
/// * `config` - The cache configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn CacheStore>)` - The opened store
/// * `Err(StorageError)` - The SQLite database could not be opened
pub fn open_store(config: &CacheConfig) -> StorageResult<Arc<dyn CacheStore>> {
    match config.backend {
        CacheBackend::Memory => {
            tracing::debug!("Using in-memory cache");
            Ok(Arc::new(MemoryStore::new()))
        }
        CacheBackend::Sqlite => {
            tracing::debug!("Using SQLite cache at {}", config.database_path);
            Ok(Arc::new(SqliteStore::new(Path::new(&config.database_path))?))
        }
    }
}

/// Opens the configured store and wraps it in a [`ComputeCache`]
pub fn open_cache(config: &CacheConfig) -> StorageResult<ComputeCache> {
    Ok(ComputeCache::new(
        open_store(config)?,
        Duration::from_secs(config.ttl_secs),
    ))
}
