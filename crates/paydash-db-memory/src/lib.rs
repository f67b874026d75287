//! In-memory store adapters for the Paydash backend.
//!
//! Implements every `paydash-storage` interface without external services:
//!
//! - [`InMemoryUserStore`] for [`UserLookup`](paydash_storage::UserLookup)
//! - [`InMemoryPaymentStore`] for [`PaymentQuery`](paydash_storage::PaymentQuery)
//! - [`InMemoryKeyValueStore`] for [`KeyValueStore`](paydash_storage::KeyValueStore)
//!
//! # Example
//!
//! ```ignore
//! use paydash_db_memory::InMemoryKeyValueStore;
//! use paydash_storage::KeyValueStore;
//!
//! let kv = InMemoryKeyValueStore::new();
//! kv.set("refresh:1", "token", Duration::from_secs(60)).await?;
//! ```

pub mod kv;
pub mod payments;
pub mod users;

pub use kv::{CachedEntry, InMemoryKeyValueStore};
pub use payments::InMemoryPaymentStore;
pub use users::InMemoryUserStore;
