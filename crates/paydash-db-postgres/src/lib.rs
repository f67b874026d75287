//! PostgreSQL store adapters for the Paydash backend.
//!
//! Provides [`UserLookup`](paydash_storage::UserLookup) over the `users` table
//! and [`PaymentQuery`](paydash_storage::PaymentQuery) over the `payments`
//! table. `payments.amount` is stored as text and ordered through a numeric
//! cast.
//!
//! # Example
//!
//! ```ignore
//! use paydash_db_postgres::{PostgresConfig, PostgresPaymentStore, create_pool};
//!
//! let pool = create_pool(&PostgresConfig::new("postgres://localhost/paydash")).await?;
//! let payments = PostgresPaymentStore::new(pool.clone());
//! ```

pub mod config;
pub mod error;
pub mod payments;
pub mod pool;
pub mod users;

use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use config::PostgresConfig;
pub use error::{PostgresError, Result};
pub use payments::PostgresPaymentStore;
pub use pool::{create_pool, ensure_schema};
pub use users::PostgresUserStore;
