//! # paydash-storage
//!
//! Storage abstraction layer for the Paydash backend.
//!
//! This crate defines the capability interfaces the core depends on. It does
//! not contain any implementations; those are provided by separate crates.
//!
//! - [`UserLookup`]: principals by email or id
//! - [`PaymentQuery`]: the filtered, sorted payments listing
//! - [`KeyValueStore`]: ephemeral strings with TTL (refresh registry, cache)
//!
//! Every call made through these traits by the core is wrapped in
//! [`bounded`] so that a slow dependency cannot hold a request indefinitely.
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Duration;
//! use paydash_storage::{bounded, KeyValueStore, StorageResult};
//!
//! async fn read(kv: &dyn KeyValueStore, key: &str) -> StorageResult<Option<String>> {
//!     bounded(Duration::from_secs(2), "kv.get", kv.get(key)).await
//! }
//! ```

pub mod error;
pub mod redact;
pub mod timeout;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use redact::mask_password;
pub use timeout::{DEFAULT_STORE_TIMEOUT, bounded};
pub use traits::{KeyValueStore, PaymentQuery, UserLookup};

use std::sync::Arc;

/// Shared handle to a principal lookup.
pub type DynUserLookup = Arc<dyn UserLookup>;

/// Shared handle to a payments query.
pub type DynPaymentQuery = Arc<dyn PaymentQuery>;

/// Shared handle to a key/value store.
pub type DynKeyValueStore = Arc<dyn KeyValueStore>;
