//! Bounded waits for store and cache calls.

use std::future::Future;
use std::time::Duration;

use crate::error::{StorageError, StorageResult};

/// Default budget for a single store or cache round-trip.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(3);

/// Runs `fut` with a deadline. An elapsed deadline becomes
/// [`StorageError::Timeout`] naming `operation`.
///
/// # Errors
///
/// Returns the future's own error, or `Timeout` if `limit` elapses first.
pub async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> StorageResult<T>
where
    F: Future<Output = StorageResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, timeout_ms = limit.as_millis() as u64, "store call timed out");
            Err(StorageError::timeout(operation, limit))
        }
    }
}
