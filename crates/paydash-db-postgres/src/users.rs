//! Principal lookups against the `users` table.

use async_trait::async_trait;
use paydash_core::Principal;
use paydash_storage::{StorageResult, UserLookup};
use sqlx_core::query_as::query_as;

use crate::PgPool;
use crate::error::PostgresError;

type UserTuple = (String, String, String, String);

fn from_tuple(row: UserTuple) -> Principal {
    Principal {
        id: row.0,
        email: row.1,
        password_hash: row.2,
        role: row.3,
    }
}

/// [`UserLookup`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserLookup for PostgresUserStore {
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<Principal>> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, email, password_hash, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(PostgresError::from)?;

        Ok(row.map(from_tuple))
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Principal>> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, email, password_hash, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(PostgresError::from)?;

        Ok(row.map(from_tuple))
    }
}
