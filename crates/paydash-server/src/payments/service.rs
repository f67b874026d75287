//! Cache-aside payments listing.

use std::sync::Arc;
use std::time::Duration;

use paydash_core::{AppError, AppResult, Payment, PaymentFilters, PaymentListQuery, SortSpec};
use paydash_storage::{DynKeyValueStore, DynPaymentQuery, bounded};

/// Lifetime of a cached listing. Entries are never invalidated on write.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

const CACHE_KEY_PREFIX: &str = "payments:";

/// Derives the cache key for a listing.
///
/// Every supplied filter pair contributes, in name order, followed by the raw
/// sort string. Two requests with the same filters in a different order share
/// a key.
pub fn cache_key(filters: &PaymentFilters, sort: &SortSpec) -> String {
    let mut key = String::from(CACHE_KEY_PREFIX);
    for (name, value) in filters.iter() {
        key.push_str(name);
        key.push('=');
        key.push_str(value);
        key.push(';');
    }
    key.push_str("sort=");
    key.push_str(sort.raw());
    key
}

/// Read-through listing over a [`PaymentQuery`](paydash_storage::PaymentQuery).
///
/// The cache is an optimization only: read failures, timeouts and corrupt
/// values are treated as a miss, and write failures are logged and dropped.
pub struct PaymentService {
    query: DynPaymentQuery,
    cache: Option<DynKeyValueStore>,
    cache_timeout: Duration,
    store_timeout: Duration,
}

impl PaymentService {
    pub fn new(
        query: DynPaymentQuery,
        cache: Option<DynKeyValueStore>,
        cache_timeout: Duration,
        store_timeout: Duration,
    ) -> Self {
        Self {
            query,
            cache,
            cache_timeout,
            store_timeout,
        }
    }

    pub async fn list(&self, filters: PaymentFilters, sort: SortSpec) -> AppResult<Vec<Payment>> {
        let key = cache_key(&filters, &sort);

        if let Some(payments) = self.read_cache(&key).await {
            return Ok(payments);
        }

        let query = PaymentListQuery::new(filters, sort);
        let payments = bounded(
            self.store_timeout,
            "payments.list",
            self.query.list_payments(&query),
        )
        .await
        .map_err(|e| AppError::internal_with("failed to fetch payments", e))?;

        self.write_cache(&key, &payments).await;
        Ok(payments)
    }

    async fn read_cache(&self, key: &str) -> Option<Vec<Payment>> {
        let cache = self.cache.as_ref()?;
        match bounded(self.cache_timeout, "cache.get", cache.get(key)).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Payment>>(&raw) {
                Ok(payments) => {
                    tracing::debug!(key = %key, "payments cache hit");
                    Some(payments)
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "payments cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "payments cache read failed");
                None
            }
        }
    }

    async fn write_cache(&self, key: &str, payments: &[Payment]) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let encoded = match serde_json::to_string(payments) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to encode payments for cache");
                return;
            }
        };
        if let Err(e) = bounded(
            self.cache_timeout,
            "cache.set",
            cache.set(key, &encoded, CACHE_TTL),
        )
        .await
        {
            tracing::warn!(key = %key, error = %e, "payments cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use paydash_core::PaymentStatus;
    use paydash_db_memory::{InMemoryKeyValueStore, InMemoryPaymentStore};
    use paydash_storage::{KeyValueStore, PaymentQuery, StorageError, StorageResult};

    struct CountingQuery {
        inner: InMemoryPaymentStore,
        calls: AtomicUsize,
    }

    impl CountingQuery {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentQuery for CountingQuery {
        async fn list_payments(&self, query: &PaymentListQuery) -> StorageResult<Vec<Payment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_payments(query).await
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl KeyValueStore for BrokenCache {
        async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::connection("refused"))
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> StorageResult<()> {
            Err(StorageError::connection("refused"))
        }
        async fn delete(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::connection("refused"))
        }
    }

    struct HangingCache;

    #[async_trait]
    impl KeyValueStore for HangingCache {
        async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            std::future::pending().await
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> StorageResult<()> {
            std::future::pending().await
        }
        async fn delete(&self, _key: &str) -> StorageResult<()> {
            std::future::pending().await
        }
    }

    struct FailingQuery;

    #[async_trait]
    impl PaymentQuery for FailingQuery {
        async fn list_payments(&self, _query: &PaymentListQuery) -> StorageResult<Vec<Payment>> {
            Err(StorageError::backend("relation \"payments\" does not exist"))
        }
    }

    fn payment(id: &str, status: PaymentStatus, amount: &str, minute: u8) -> Payment {
        Payment {
            id: id.into(),
            merchant: "Acme".into(),
            status,
            amount: amount.into(),
            created_at: time::macros::datetime!(2024-01-01 10:00 UTC)
                + time::Duration::minutes(minute.into()),
        }
    }

    fn counting_query() -> Arc<CountingQuery> {
        Arc::new(CountingQuery {
            inner: InMemoryPaymentStore::with_payments([
                payment("x", PaymentStatus::Completed, "10.00", 0),
                payment("y", PaymentStatus::Completed, "2.50", 1),
                payment("z", PaymentStatus::Failed, "99.99", 2),
            ]),
            calls: AtomicUsize::new(0),
        })
    }

    fn service(query: Arc<CountingQuery>, cache: Option<DynKeyValueStore>) -> PaymentService {
        PaymentService::new(
            query,
            cache,
            Duration::from_millis(50),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_cache_key_format() {
        let filters = PaymentFilters::new()
            .with("status", "completed")
            .with("id", "x");
        assert_eq!(
            cache_key(&filters, &SortSpec::parse("-created_at")),
            "payments:id=x;status=completed;sort=-created_at"
        );
        assert_eq!(
            cache_key(&PaymentFilters::new(), &SortSpec::default()),
            "payments:sort="
        );
    }

    #[tokio::test]
    async fn test_reordered_filters_hit_the_cache() {
        let query = counting_query();
        let cache = Arc::new(InMemoryKeyValueStore::new());
        let svc = service(query.clone(), Some(cache.clone()));

        let first = svc
            .list(
                PaymentFilters::new()
                    .with("status", "completed")
                    .with("id", "x"),
                SortSpec::parse("-created_at"),
            )
            .await
            .unwrap();
        let second = svc
            .list(
                PaymentFilters::new()
                    .with("id", "x")
                    .with("status", "completed"),
                SortSpec::parse("-created_at"),
            )
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(query.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_different_sort_is_a_different_entry() {
        let query = counting_query();
        let svc = service(query.clone(), Some(Arc::new(InMemoryKeyValueStore::new())));

        let by_amount = svc
            .list(PaymentFilters::new(), SortSpec::parse("amount"))
            .await
            .unwrap();
        let newest = svc
            .list(PaymentFilters::new(), SortSpec::parse("-created_at"))
            .await
            .unwrap();

        assert_eq!(query.calls(), 2);
        let ids: Vec<_> = by_amount.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["y", "x", "z"]);
        let ids: Vec<_> = newest.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["z", "y", "x"]);
    }

    #[tokio::test]
    async fn test_corrupt_entry_falls_through_and_is_replaced() {
        let query = counting_query();
        let cache = Arc::new(InMemoryKeyValueStore::new());
        let filters = PaymentFilters::new().with("status", "failed");
        let sort = SortSpec::default();
        let key = cache_key(&filters, &sort);
        cache
            .set(&key, "{not json", Duration::from_secs(60))
            .await
            .unwrap();

        let svc = service(query.clone(), Some(cache.clone()));
        let payments = svc.list(filters.clone(), sort.clone()).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].id, "z");
        assert_eq!(query.calls(), 1);

        let cached = cache.get(&key).await.unwrap().unwrap();
        let decoded: Vec<Payment> = serde_json::from_str(&cached).unwrap();
        assert_eq!(decoded, payments);

        svc.list(filters, sort).await.unwrap();
        assert_eq!(query.calls(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_cache_never_fails_the_request() {
        let query = counting_query();
        let svc = service(query.clone(), Some(Arc::new(BrokenCache)));
        let payments = svc
            .list(PaymentFilters::new(), SortSpec::default())
            .await
            .unwrap();
        assert_eq!(payments.len(), 3);

        let svc = service(query.clone(), Some(Arc::new(HangingCache)));
        let payments = svc
            .list(PaymentFilters::new(), SortSpec::default())
            .await
            .unwrap();
        assert_eq!(payments.len(), 3);
        assert_eq!(query.calls(), 2);
    }

    #[tokio::test]
    async fn test_no_cache_always_queries() {
        let query = counting_query();
        let svc = service(query.clone(), None);
        svc.list(PaymentFilters::new(), SortSpec::default())
            .await
            .unwrap();
        svc.list(PaymentFilters::new(), SortSpec::default())
            .await
            .unwrap();
        assert_eq!(query.calls(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_without_detail() {
        let svc = PaymentService::new(
            Arc::new(FailingQuery),
            Some(Arc::new(InMemoryKeyValueStore::new())),
            Duration::from_millis(50),
            Duration::from_secs(1),
        );
        let err = svc
            .list(PaymentFilters::new(), SortSpec::default())
            .await
            .unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.message(), "failed to fetch payments");
    }
}
