//! Port abstraction for the synchronized user store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::user::{SyncedUser, WorkosUserId};

/// Persistence errors raised by [`UserStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    /// Store connection could not be established.
    #[error("user store connection failed: {message}")]
    Connection {
        /// Adapter failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user store query failed: {message}")]
    Query {
        /// Adapter failure description.
        message: String,
    },
}

impl UserStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence port for the synchronized user projection.
///
/// Mutations must be atomic single statements: reconciliation relies on the
/// store's unique constraint on the provider ID, not on application-level
/// locking, to stay convergent under concurrent duplicate deliveries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch a synchronized user by provider ID.
    async fn find_by_workos_id(
        &self,
        workos_id: &WorkosUserId,
    ) -> Result<Option<SyncedUser>, UserStoreError>;

    /// Insert or update a record keyed by its provider ID.
    async fn upsert(&self, user: &SyncedUser) -> Result<(), UserStoreError>;

    /// Delete the record for a provider ID, returning the number of rows
    /// removed. Deleting an absent record is a no-op (`Ok(0)`), not an error.
    async fn delete_by_workos_id(&self, workos_id: &WorkosUserId) -> Result<u64, UserStoreError>;
}
