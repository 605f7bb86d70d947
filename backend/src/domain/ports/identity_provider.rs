//! Port abstraction for the hosted identity provider.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::user::WorkosUserId;

/// Three-way answer to "does this user currently exist upstream?".
///
/// The port never collapses an inconclusive check into [`Self::Absent`]; a
/// transient provider outage must be distinguishable from a confirmed
/// deletion so callers can apply an explicit fail-open or fail-closed policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserExistence {
    /// The provider confirmed the user exists.
    Exists,
    /// The provider confirmed the user does not exist.
    Absent,
    /// The check could not be completed; the upstream state is unknown.
    Unknown {
        /// Why the check was inconclusive, preserved for logs.
        reason: String,
    },
}

/// Failures raised by [`IdentityProvider`] adapters.
///
/// "User not found" is not an error: it is the [`UserExistence::Absent`]
/// success case. These variants cover the check itself failing to run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityProviderError {
    /// Network-level failure reaching the provider.
    #[error("identity provider transport failure: {message}")]
    Transport {
        /// Adapter failure description.
        message: String,
    },
    /// The request timed out.
    #[error("identity provider timed out: {message}")]
    Timeout {
        /// Adapter failure description.
        message: String,
    },
    /// The provider rejected the API credentials.
    #[error("identity provider rejected credentials: {message}")]
    Auth {
        /// Adapter failure description.
        message: String,
    },
    /// The provider throttled the request.
    #[error("identity provider rate limited the request: {message}")]
    RateLimited {
        /// Adapter failure description.
        message: String,
    },
    /// The provider answered with a body this adapter could not interpret.
    #[error("identity provider response could not be decoded: {message}")]
    Decode {
        /// Adapter failure description.
        message: String,
    },
}

impl IdentityProviderError {
    /// Helper for transport-level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for timeouts.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Helper for credential rejections.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Helper for throttled requests.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Helper for undecodable responses.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Lookup port against the authoritative identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check whether a user currently exists upstream.
    ///
    /// Adapters return `Ok(Exists)` or `Ok(Absent)` for conclusive answers
    /// and `Err` when the check could not run; callers decide what an
    /// inconclusive check means for their operation.
    async fn fetch_user(
        &self,
        workos_id: &WorkosUserId,
    ) -> Result<UserExistence, IdentityProviderError>;
}
