//! Synchronized user data model.
//!
//! A [`SyncedUser`] is the local projection of an identity-provider user.
//! Rows are created and removed exclusively by the webhook reconciliation
//! pipeline; no other component owns this table.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors returned by [`WorkosUserId::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkosUserIdValidationError {
    /// The identifier was empty after trimming whitespace.
    Empty,
    /// The identifier contained surrounding or embedded whitespace.
    ContainsWhitespace,
}

impl fmt::Display for WorkosUserIdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "provider user id must not be empty"),
            Self::ContainsWhitespace => {
                write!(f, "provider user id must not contain whitespace")
            }
        }
    }
}

impl std::error::Error for WorkosUserIdValidationError {}

/// Identity-provider user identifier.
///
/// This is the join key between the webhook event stream and the local
/// `synced_users` row. It is provider-owned and opaque (e.g. `user_01H...`),
/// so no structural validation beyond non-emptiness is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkosUserId(String);

impl WorkosUserId {
    /// Validate and construct a [`WorkosUserId`] from borrowed input.
    ///
    /// # Errors
    ///
    /// Returns a [`WorkosUserIdValidationError`] when the input is blank or
    /// contains whitespace.
    pub fn new(id: impl AsRef<str>) -> Result<Self, WorkosUserIdValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    fn from_owned(id: String) -> Result<Self, WorkosUserIdValidationError> {
        if id.trim().is_empty() {
            return Err(WorkosUserIdValidationError::Empty);
        }
        if id.chars().any(char::is_whitespace) {
            return Err(WorkosUserIdValidationError::ContainsWhitespace);
        }
        Ok(Self(id))
    }

    /// Borrow the underlying identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for WorkosUserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for WorkosUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<WorkosUserId> for String {
    fn from(value: WorkosUserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for WorkosUserId {
    type Error = WorkosUserIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Local projection of an identity-provider user.
///
/// ## Invariants
/// - At most one record exists per `workos_id` (unique constraint plus
///   single-statement upsert at the storage layer).
/// - `password` is always `None` for provider-managed users; the column only
///   exists so the table can also hold credential-bearing rows seeded outside
///   this pipeline.
/// - `updated_at` carries the last applied event's effective timestamp, not
///   the wall-clock write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncedUser {
    /// Identity-provider user identifier (join key).
    #[schema(value_type = String, example = "user_01HXYZ8BC9TJ2M4N6P8Q0RSTV")]
    pub workos_id: WorkosUserId,
    /// Email address; may change over the user's lifetime upstream.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Local credential; always `None` for provider-managed users.
    pub password: Option<String>,
    /// Provider-side creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Effective timestamp of the last applied event.
    pub updated_at: DateTime<Utc>,
}

impl SyncedUser {
    /// Build a provider-managed record (no local credential).
    #[must_use]
    pub fn provider_managed(
        workos_id: WorkosUserId,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            workos_id,
            email: email.into(),
            password: None,
            created_at,
            updated_at,
        }
    }
}
