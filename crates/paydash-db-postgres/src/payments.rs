//! Payments listing against the `payments` table.
//!
//! Filter values are always bound as parameters. Sort terms come from the
//! closed [`SortField`] set, so the `ORDER BY` text never contains caller
//! input.

use async_trait::async_trait;
use paydash_core::{Payment, PaymentListQuery, SortClause, SortField};
use paydash_storage::{PaymentQuery, StorageResult};
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use crate::PgPool;
use crate::error::PostgresError;

type PaymentTuple = (String, String, String, String, OffsetDateTime);

fn from_tuple(row: PaymentTuple) -> Result<Payment, PostgresError> {
    let status = row
        .2
        .parse()
        .map_err(|e: paydash_core::UnknownPaymentStatus| PostgresError::invalid_row(e.to_string()))?;

    Ok(Payment {
        id: row.0,
        merchant: row.1,
        status,
        amount: row.3,
        created_at: row.4,
    })
}

/// SQL expression for a sort field. `amount` is text and is ordered numerically.
fn sort_expression(field: SortField) -> &'static str {
    match field {
        SortField::Amount => "CAST(amount AS NUMERIC)",
        other => other.column(),
    }
}

fn order_by(clauses: &[SortClause]) -> String {
    clauses
        .iter()
        .map(|c| format!("{} {}", sort_expression(c.field), c.direction.as_sql()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the listing SQL and the values to bind, in placeholder order.
fn build_list_sql(query: &PaymentListQuery) -> (String, Vec<String>) {
    let mut sql =
        String::from("SELECT id, merchant, status, amount, created_at FROM payments WHERE 1=1");
    let mut binds = Vec::new();

    for (field, value) in query.filters.applied() {
        binds.push(value.to_string());
        sql.push_str(&format!(" AND {} = ${}", field.column(), binds.len()));
    }

    sql.push_str(" ORDER BY ");
    sql.push_str(&order_by(query.sort.clauses()));

    (sql, binds)
}

/// [`PaymentQuery`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentQuery for PostgresPaymentStore {
    async fn list_payments(&self, query: &PaymentListQuery) -> StorageResult<Vec<Payment>> {
        let (sql, binds) = build_list_sql(query);
        tracing::debug!(sql = %sql, params = binds.len(), "Listing payments");

        let mut statement = query_as::<_, PaymentTuple>(&sql);
        for value in binds {
            statement = statement.bind(value);
        }

        let rows = statement
            .fetch_all(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        let payments = rows
            .into_iter()
            .map(from_tuple)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(payments)
    }
}
