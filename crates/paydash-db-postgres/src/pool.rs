//! Connection pool and schema bootstrap.

use std::time::Duration;

use sqlx_core::pool::PoolOptions;
use sqlx_core::query::query;
use paydash_storage::mask_password;
use sqlx_postgres::Postgres;
use tracing::{debug, info, instrument};

use crate::PgPool;
use crate::config::PostgresConfig;
use crate::error::Result;

/// Type alias for PostgreSQL pool options.
pub type PgPoolOptions = PoolOptions<Postgres>;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id TEXT PRIMARY KEY,
        merchant TEXT NOT NULL,
        status TEXT NOT NULL,
        amount TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Creates a new PostgreSQL connection pool from the given configuration.
#[instrument(skip(config), fields(url = %mask_password(&config.url)))]
pub async fn create_pool(config: &PostgresConfig) -> Result<PgPool> {
    info!(
        pool_size = config.pool_size,
        connect_timeout_ms = config.connect_timeout_ms,
        "Creating PostgreSQL connection pool"
    );

    let mut options = PgPoolOptions::new()
        .max_connections(config.pool_size)
        .min_connections((config.pool_size / 4).max(1))
        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms));

    if let Some(idle_timeout) = config.idle_timeout_ms {
        options = options.idle_timeout(Duration::from_millis(idle_timeout));
    }

    let pool = options.connect(&config.url).await?;

    if config.ensure_schema {
        ensure_schema(&pool).await?;
    }

    debug!("PostgreSQL connection pool created successfully");

    Ok(pool)
}

/// Creates the `users` and `payments` tables if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        query(statement).execute(pool).await?;
    }
    Ok(())
}
