//! Capability interfaces implemented by storage adapters.
//!
//! Components depend on these traits only; concrete adapters live in
//! `paydash-db-memory`, `paydash-db-postgres` and the server's Redis module.

use std::time::Duration;

use async_trait::async_trait;
use paydash_core::{Payment, PaymentListQuery, Principal};

use crate::error::StorageResult;

/// Read access to principals.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Finds a principal by email address.
    ///
    /// Returns `None` if no principal has this email.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing principals.
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<Principal>>;

    /// Finds a principal by id.
    ///
    /// Returns `None` if the principal does not exist (e.g. the account was deleted).
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues.
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Principal>>;
}

/// The payments listing query.
#[async_trait]
pub trait PaymentQuery: Send + Sync {
    /// Lists payments matching the whitelisted filters of `query`, ordered by
    /// its resolved sort clauses.
    ///
    /// `amount` must be ordered by numeric value, not lexically.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or a row cannot be decoded.
    async fn list_payments(&self, query: &PaymentListQuery) -> StorageResult<Vec<Payment>>;
}

/// An ephemeral string store with per-key expiry.
///
/// Backs both the refresh token registry and the listing cache. An expired
/// key is indistinguishable from one that was never written.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. Returns `None` if absent or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a value unconditionally, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StorageResult<()>;

    /// Removes a key. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
