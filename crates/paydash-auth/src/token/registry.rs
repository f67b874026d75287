//! Refresh token registry.
//!
//! Holds the single currently valid refresh token per principal under
//! `refresh:<principal_id>`. A write replaces the previous value outright,
//! which is what makes older refresh tokens unusable.

use std::sync::Arc;
use std::time::Duration;

use paydash_storage::{KeyValueStore, StorageResult, bounded};

/// Lifetime of a refresh token, both as its embedded `exp` and as its
/// registry TTL.
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const KEY_PREFIX: &str = "refresh:";

/// Registry key for a principal.
#[must_use]
pub fn registry_key(principal_id: &str) -> String {
    format!("{KEY_PREFIX}{principal_id}")
}

/// Principal -> current refresh token, on an ephemeral TTL store.
#[derive(Clone)]
pub struct RefreshTokenRegistry {
    store: Arc<dyn KeyValueStore>,
    timeout: Duration,
}

impl RefreshTokenRegistry {
    /// Creates a registry; every call is bounded by `timeout`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Unconditionally stores `token` as the principal's refresh token.
    ///
    /// # Errors
    /// Returns an error if the store fails or times out.
    pub async fn put(&self, principal_id: &str, token: &str, ttl: Duration) -> StorageResult<()> {
        let key = registry_key(principal_id);
        bounded(self.timeout, "registry.put", self.store.set(&key, token, ttl)).await
    }

    /// Returns the principal's current refresh token, if any.
    ///
    /// # Errors
    /// Returns an error if the store fails or times out.
    pub async fn get(&self, principal_id: &str) -> StorageResult<Option<String>> {
        let key = registry_key(principal_id);
        bounded(self.timeout, "registry.get", self.store.get(&key)).await
    }

    /// Removes the principal's refresh token.
    ///
    /// # Errors
    /// Returns an error if the store fails or times out.
    pub async fn delete(&self, principal_id: &str) -> StorageResult<()> {
        let key = registry_key(principal_id);
        bounded(self.timeout, "registry.delete", self.store.delete(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paydash_db_memory::InMemoryKeyValueStore;

    fn registry() -> (RefreshTokenRegistry, InMemoryKeyValueStore) {
        let kv = InMemoryKeyValueStore::new();
        let registry = RefreshTokenRegistry::new(Arc::new(kv.clone()), Duration::from_secs(1));
        (registry, kv)
    }

    #[test]
    fn test_ttl_is_seven_days() {
        assert_eq!(REFRESH_TOKEN_TTL.as_secs(), 604_800);
        assert_eq!(registry_key("17"), "refresh:17");
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (registry, kv) = registry();

        registry.put("1", "first", REFRESH_TOKEN_TTL).await.unwrap();
        registry.put("1", "second", REFRESH_TOKEN_TTL).await.unwrap();

        assert_eq!(registry.get("1").await.unwrap().as_deref(), Some("second"));
        assert_eq!(kv.get("refresh:1").await.unwrap().as_deref(), Some("second"));
        assert_eq!(kv.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_and_expiry_look_alike() {
        let (registry, _) = registry();

        registry.put("1", "t", REFRESH_TOKEN_TTL).await.unwrap();
        registry.delete("1").await.unwrap();
        assert_eq!(registry.get("1").await.unwrap(), None);

        registry.put("2", "t", Duration::from_millis(5)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(registry.get("2").await.unwrap(), None);
    }
}
