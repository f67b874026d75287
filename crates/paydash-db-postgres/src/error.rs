//! Error types for the PostgreSQL store.

use paydash_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// Errors specific to the PostgreSQL store.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    /// A row held a value outside the domain (e.g. an unknown status).
    #[error("Invalid row: {message}")]
    InvalidRow { message: String },
}

impl PostgresError {
    #[must_use]
    pub fn invalid_row(message: impl Into<String>) -> Self {
        Self::InvalidRow {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Database(e) => match &e {
                SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) | SqlxError::Tls(_) => {
                    StorageError::connection(e.to_string())
                }
                SqlxError::ColumnDecode { .. } | SqlxError::Decode(_) | SqlxError::ColumnNotFound(_) => {
                    StorageError::decode(e.to_string())
                }
                _ => StorageError::backend(e.to_string()),
            },
            PostgresError::InvalidRow { message } => StorageError::decode(message),
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_connection_error() {
        let err: StorageError = PostgresError::Database(SqlxError::PoolTimedOut).into();
        assert!(matches!(err, StorageError::Connection { .. }));
    }

    #[test]
    fn test_invalid_row_is_decode_error() {
        let err: StorageError = PostgresError::invalid_row("unknown payment status: refunded").into();
        assert!(matches!(err, StorageError::Decode { .. }));
    }

    #[test]
    fn test_other_errors_are_backend_errors() {
        let err: StorageError = PostgresError::Database(SqlxError::RowNotFound).into();
        assert!(matches!(err, StorageError::Backend { .. }));
    }
}
