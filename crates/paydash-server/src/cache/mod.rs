//! Key/value backend selection.
//!
//! One store serves both the refresh token registry and the payments listing
//! cache. Redis is used when enabled; otherwise entries live in process memory.

pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use paydash_db_memory::InMemoryKeyValueStore;
use paydash_storage::{DynKeyValueStore, StorageResult};

use crate::config::RedisConfig;

pub use self::redis::{RedisKeyValueStore, create_redis_pool};

/// Interval between sweeps of expired in-memory entries.
pub const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Creates the key/value store described by `config`.
///
/// An enabled but unreachable Redis is an error: the registry would otherwise
/// silently fall back to a store that other instances cannot see.
pub async fn create_kv_store(config: &RedisConfig) -> StorageResult<DynKeyValueStore> {
    if !config.enabled {
        tracing::info!("Redis disabled, using in-memory key/value store");
        let store = InMemoryKeyValueStore::new();
        spawn_purge_task(store.clone(), PURGE_INTERVAL);
        return Ok(Arc::new(store));
    }

    let pool = create_redis_pool(config).await?;
    Ok(Arc::new(RedisKeyValueStore::new(pool)))
}

/// Periodically drops expired entries that were never read again.
pub fn spawn_purge_task(store: InMemoryKeyValueStore, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, "purged expired key/value entries");
            }
        }
    });
}
