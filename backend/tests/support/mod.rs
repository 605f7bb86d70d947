//! In-memory port implementations for the reconciliation property suite.
//!
//! The store mirrors the PostgreSQL adapter's observable semantics: upserts
//! are keyed by provider ID and replace email/password/`updated_at` while
//! preserving the original `created_at`, and deletes report how many rows
//! they removed. The provider is scriptable so each phase of a test can pin
//! the upstream answer.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use backend::domain::ports::{
    IdentityProvider, IdentityProviderError, UserExistence, UserStore, UserStoreError,
};
use backend::domain::user::{SyncedUser, WorkosUserId};

/// Map-backed [`UserStore`] whose mutex stands in for the database's
/// row-level atomicity.
#[derive(Default)]
pub struct InMemoryUserStore {
    rows: Mutex<HashMap<String, SyncedUser>>,
}

impl InMemoryUserStore {
    /// Number of rows currently stored.
    pub fn len(&self) -> usize {
        self.rows.lock().expect("store poisoned").len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_workos_id(
        &self,
        workos_id: &WorkosUserId,
    ) -> Result<Option<SyncedUser>, UserStoreError> {
        let rows = self.rows.lock().expect("store poisoned");
        Ok(rows.get(workos_id.as_str()).cloned())
    }

    async fn upsert(&self, user: &SyncedUser) -> Result<(), UserStoreError> {
        let mut rows = self.rows.lock().expect("store poisoned");
        let mut record = user.clone();
        if let Some(existing) = rows.get(user.workos_id.as_str()) {
            record.created_at = existing.created_at;
        }
        rows.insert(user.workos_id.as_str().to_owned(), record);
        Ok(())
    }

    async fn delete_by_workos_id(&self, workos_id: &WorkosUserId) -> Result<u64, UserStoreError> {
        let mut rows = self.rows.lock().expect("store poisoned");
        Ok(u64::from(rows.remove(workos_id.as_str()).is_some()))
    }
}

/// Scriptable [`IdentityProvider`] returning whatever answer a test pinned.
pub struct ScriptedIdentityProvider {
    answer: Mutex<Result<UserExistence, IdentityProviderError>>,
}

impl ScriptedIdentityProvider {
    /// Create a provider that starts with the given answer.
    pub fn answering(answer: Result<UserExistence, IdentityProviderError>) -> Self {
        Self {
            answer: Mutex::new(answer),
        }
    }

    /// Replace the scripted answer for subsequent lookups.
    pub fn set(&self, answer: Result<UserExistence, IdentityProviderError>) {
        *self.answer.lock().expect("provider poisoned") = answer;
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentityProvider {
    async fn fetch_user(
        &self,
        _workos_id: &WorkosUserId,
    ) -> Result<UserExistence, IdentityProviderError> {
        self.answer.lock().expect("provider poisoned").clone()
    }
}
