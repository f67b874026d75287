//! Storage error types.

use std::time::Duration;

use paydash_core::AppError;

/// Errors raised by store and cache adapters.
///
/// Messages may contain backend detail (hostnames, SQL state). They are meant
/// for logs; the conversion into [`AppError`] keeps them as the hidden cause.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to reach the backend or obtain a connection.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// The call did not complete within its time budget.
    #[error("Timed out after {after:?}: {operation}")]
    Timeout {
        /// Name of the operation that timed out.
        operation: &'static str,
        /// The budget that elapsed.
        after: Duration,
    },

    /// The backend rejected or failed the operation.
    #[error("Backend error: {message}")]
    Backend {
        /// Description of the backend error.
        message: String,
    },

    /// A stored row or value could not be decoded into a domain type.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        Self::Timeout { operation, after }
    }

    /// Creates a new `Backend` error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<StorageError> for AppError {
    fn from(error: StorageError) -> Self {
        AppError::internal_with("storage operation failed", error)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::connection("refused");
        assert_eq!(err.to_string(), "Connection error: refused");

        let err = StorageError::timeout("kv.get", Duration::from_secs(2));
        assert_eq!(err.to_string(), "Timed out after 2s: kv.get");
        assert!(err.is_timeout());
    }

    #[test]
    fn test_into_app_error_is_internal() {
        let app: AppError = StorageError::backend("relation \"users\" does not exist").into();

        assert!(app.is_server_error());
        assert_eq!(app.message(), "storage operation failed");
        assert!(app.source().is_some());
    }
}
