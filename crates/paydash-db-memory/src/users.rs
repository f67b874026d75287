//! In-memory principal directory.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use paydash_core::Principal;
use paydash_storage::{StorageResult, UserLookup};

/// Principals keyed by id, with a secondary email index.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    by_id: Arc<DashMap<String, Principal>>,
    email_index: Arc<DashMap<String, String>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `principals`.
    pub fn with_principals(principals: impl IntoIterator<Item = Principal>) -> Self {
        let store = Self::new();
        for principal in principals {
            store.insert(principal);
        }
        store
    }

    /// Inserts or replaces a principal.
    pub fn insert(&self, principal: Principal) {
        if let Some(previous) = self.by_id.get(&principal.id) {
            self.email_index.remove(&previous.email);
        }
        self.email_index
            .insert(principal.email.clone(), principal.id.clone());
        self.by_id.insert(principal.id.clone(), principal);
    }

    /// Removes a principal by id, returning it if present.
    pub fn remove(&self, id: &str) -> Option<Principal> {
        let (_, principal) = self.by_id.remove(id)?;
        self.email_index.remove(&principal.email);
        Some(principal)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[async_trait]
impl UserLookup for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<Principal>> {
        let Some(id) = self.email_index.get(email).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self.by_id.get(&id).map(|p| p.clone()))
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Principal>> {
        Ok(self.by_id.get(id).map(|p| p.clone()))
    }
}
