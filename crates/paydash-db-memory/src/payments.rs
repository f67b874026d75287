//! In-memory payments listing.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use paydash_core::{FilterField, Payment, PaymentListQuery, SortClause, SortDirection, SortField};
use paydash_storage::{PaymentQuery, StorageResult};
use tokio::sync::RwLock;

/// Payments held in insertion order; queries filter and sort a snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentStore {
    rows: Arc<RwLock<Vec<Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payments(payments: impl IntoIterator<Item = Payment>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(payments.into_iter().collect())),
        }
    }

    pub async fn insert(&self, payment: Payment) {
        self.rows.write().await.push(payment);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

fn matches(payment: &Payment, field: FilterField, value: &str) -> bool {
    match field {
        FilterField::Id => payment.id == value,
        FilterField::Status => payment.status.as_str() == value,
    }
}

/// Numeric, not lexical: "9.00" < "10.00". Amounts that do not parse sort
/// after every numeric amount. Postgres rejects such rows at query time
/// (`CAST(amount AS NUMERIC)`), so the two backends differ on bad data.
fn compare_amounts(a: &Payment, b: &Payment) -> Ordering {
    match (a.amount_value(), b.amount_value()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &Payment, b: &Payment, clause: &SortClause) -> Ordering {
    let ordering = match clause.field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Merchant => a.merchant.cmp(&b.merchant),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::Amount => compare_amounts(a, b),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };

    match clause.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl PaymentQuery for InMemoryPaymentStore {
    async fn list_payments(&self, query: &PaymentListQuery) -> StorageResult<Vec<Payment>> {
        let filters: Vec<_> = query.filters.applied().collect();

        let mut result: Vec<Payment> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|p| filters.iter().all(|(field, value)| matches(p, *field, value)))
            .cloned()
            .collect();

        let clauses = query.sort.clauses();
        result.sort_by(|a, b| {
            clauses
                .iter()
                .map(|clause| compare(a, b, clause))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        Ok(result)
    }
}
