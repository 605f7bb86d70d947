//! Typed webhook event model.
//!
//! Inbound deliveries arrive as untrusted JSON. The boundary narrows them
//! into [`WebhookEvent`] before any reconciliation logic runs, so the core
//! never touches dynamically typed payloads. Unrecognised event types are a
//! first-class variant, not a parse failure: the provider emits many event
//! families this service deliberately ignores.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::user::{WorkosUserId, WorkosUserIdValidationError};

/// Event type string for user creation deliveries.
pub const USER_CREATED: &str = "user.created";
/// Event type string for user deletion deliveries.
pub const USER_DELETED: &str = "user.deleted";

/// Errors raised while narrowing an inbound delivery into a typed event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventParseError {
    /// The request body was not valid JSON.
    #[error("webhook body is not valid JSON: {message}")]
    InvalidJson {
        /// Decoder failure description.
        message: String,
    },
    /// The JSON lacked the required envelope fields.
    #[error("webhook envelope is invalid: {message}")]
    InvalidEnvelope {
        /// Explanation of the missing or malformed field.
        message: String,
    },
    /// A recognised event type carried an undeserializable `data` object.
    ///
    /// This is deliberately distinct from [`WebhookEvent::Unknown`]: silently
    /// acknowledging a corrupt payload for a type we do handle would strand
    /// the local projection.
    #[error("invalid {event_type} payload: {message}")]
    InvalidPayload {
        /// The event type whose payload failed to decode.
        event_type: String,
        /// Decoder failure description.
        message: String,
    },
}

/// Provider-side user attributes carried by a lifecycle event's `data` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    /// Provider user identifier.
    pub id: WorkosUserId,
    /// Email address at the time the event was emitted.
    pub email: String,
    /// Provider-side creation timestamp, when present.
    pub created_at: Option<DateTime<Utc>>,
    /// Provider-side last-update timestamp, when present.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A user lifecycle delivery (`user.created` or `user.deleted`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLifecycleEvent {
    /// Provider-assigned event identifier. Not guaranteed unique across
    /// retries, so it is carried for logging only, never for deduplication.
    pub id: String,
    /// Timestamp the provider emitted the event.
    pub occurred_at: DateTime<Utc>,
    /// The affected user's provider-side attributes.
    pub user: ProviderUser,
}

/// A delivery whose event type has no registered handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEvent {
    /// Provider-assigned event identifier.
    pub id: String,
    /// The unrecognised event type string.
    pub event_type: String,
}

/// Typed union of the deliveries this service understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// A user was created upstream.
    UserCreated(UserLifecycleEvent),
    /// A user was deleted upstream.
    UserDeleted(UserLifecycleEvent),
    /// An event family this service does not handle.
    Unknown(UnknownEvent),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventEnvelopeDto {
    id: String,
    event: String,
    #[serde(default, alias = "created_at")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    data: Value,
}

// Accepts both the provider's raw snake_case wire format and the camelised
// form the original SDK produced.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderUserDto {
    id: String,
    email: String,
    #[serde(default, alias = "created_at")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at")]
    updated_at: Option<DateTime<Utc>>,
}

impl WebhookEvent {
    /// Narrow a raw request body into a typed event.
    ///
    /// # Errors
    ///
    /// Returns [`EventParseError`] when the body is not JSON, the envelope is
    /// malformed, or a recognised event type carries an invalid payload.
    pub fn from_slice(body: &[u8]) -> Result<Self, EventParseError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|err| EventParseError::InvalidJson {
                message: err.to_string(),
            })?;
        Self::from_value(value)
    }

    /// Narrow an already-decoded JSON value into a typed event.
    ///
    /// # Errors
    ///
    /// Returns [`EventParseError`] when the envelope is malformed or a
    /// recognised event type carries an invalid payload.
    pub fn from_value(value: Value) -> Result<Self, EventParseError> {
        let envelope: EventEnvelopeDto =
            serde_json::from_value(value).map_err(|err| EventParseError::InvalidEnvelope {
                message: err.to_string(),
            })?;

        match envelope.event.as_str() {
            USER_CREATED => Ok(Self::UserCreated(lifecycle_event(envelope)?)),
            USER_DELETED => Ok(Self::UserDeleted(lifecycle_event(envelope)?)),
            _ => Ok(Self::Unknown(UnknownEvent {
                id: envelope.id,
                event_type: envelope.event,
            })),
        }
    }

    /// The wire event type string for this event.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::UserCreated(_) => USER_CREATED,
            Self::UserDeleted(_) => USER_DELETED,
            Self::Unknown(unknown) => unknown.event_type.as_str(),
        }
    }

    /// The provider-assigned event identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::UserCreated(event) | Self::UserDeleted(event) => event.id.as_str(),
            Self::Unknown(unknown) => unknown.id.as_str(),
        }
    }
}

fn lifecycle_event(envelope: EventEnvelopeDto) -> Result<UserLifecycleEvent, EventParseError> {
    let event_type = envelope.event;
    let occurred_at = envelope
        .created_at
        .ok_or_else(|| EventParseError::InvalidEnvelope {
            message: format!("{event_type} event is missing createdAt"),
        })?;

    let payload: ProviderUserDto =
        serde_json::from_value(envelope.data).map_err(|err| EventParseError::InvalidPayload {
            event_type: event_type.clone(),
            message: err.to_string(),
        })?;

    let id = WorkosUserId::new(&payload.id).map_err(|err: WorkosUserIdValidationError| {
        EventParseError::InvalidPayload {
            event_type: event_type.clone(),
            message: err.to_string(),
        }
    })?;

    Ok(UserLifecycleEvent {
        id: envelope.id,
        occurred_at,
        user: ProviderUser {
            id,
            email: payload.email,
            created_at: payload.created_at,
            updated_at: payload.updated_at,
        },
    })
}
