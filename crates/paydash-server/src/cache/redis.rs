//! Redis-backed [`KeyValueStore`].

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use paydash_storage::{KeyValueStore, StorageError, StorageResult, mask_password};
use redis::AsyncCommands;

use crate::config::RedisConfig;

/// Key/value store over a deadpool Redis pool.
///
/// Entries expire through Redis `SET EX`; sub-second TTLs are rounded up to
/// one second.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    pool: Pool,
}

impl RedisKeyValueStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn connection(&self) -> StorageResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::connection(format!("redis pool: {e}")))
    }
}

fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn backend(e: redis::RedisError) -> StorageError {
    if e.is_connection_dropped() || e.is_connection_refusal() || e.is_io_error() {
        StorageError::connection(e.to_string())
    } else {
        StorageError::backend(e.to_string())
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value = conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(backend)?;
        tracing::trace!(key = %key, hit = value.is_some(), "redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StorageResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs(ttl))
            .await
            .map_err(backend)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await.map_err(backend)
    }
}

/// Builds a Redis pool and checks that a connection can be obtained.
pub async fn create_redis_pool(config: &RedisConfig) -> StorageResult<Pool> {
    tracing::info!(url = %mask_password(&config.url), "Connecting to Redis");

    let mut redis_config = Config::from_url(&config.url);
    // `from_url` leaves the pool section unset.
    let pool_config = redis_config
        .pool
        .get_or_insert_with(|| deadpool_redis::PoolConfig::new(config.pool_size));
    pool_config.max_size = config.pool_size;
    pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
    pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));

    let pool = redis_config
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| StorageError::connection(format!("failed to create redis pool: {e}")))?;

    // Test connection
    pool.get()
        .await
        .map_err(|e| StorageError::connection(format!("redis unreachable: {e}")))?;
    tracing::info!("Connected to Redis");

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_rounds_up_to_one_second() {
        assert_eq!(ttl_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_secs(Duration::ZERO), 1);
        assert_eq!(ttl_secs(Duration::from_secs(300)), 300);
    }
}
