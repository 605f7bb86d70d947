//! Driving port for webhook event processing.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::event::WebhookEvent;

/// Business outcome of a processed delivery.
///
/// `success` is always `true` on the `Ok` path: both "handled" and "no
/// handler registered" are normal outcomes the provider must not retry.
/// Failures travel through the `Err` channel instead, so the HTTP boundary
/// alone decides what status code a failure maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Whether the delivery was accepted (always `true` on the `Ok` path).
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
}

impl ProcessOutcome {
    /// Outcome for a successfully handled event.
    #[must_use]
    pub fn processed(event_type: &str) -> Self {
        Self {
            success: true,
            message: format!("Successfully processed {event_type}"),
        }
    }

    /// Outcome for an event type with no registered handler.
    #[must_use]
    pub fn ignored(event_type: &str) -> Self {
        Self {
            success: true,
            message: format!("No handler found for event type: {event_type}"),
        }
    }
}

/// Driving port invoked by the webhook HTTP adapter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookCommand: Send + Sync {
    /// Reconcile the user store against a single typed delivery.
    ///
    /// Unknown event types resolve `Ok` with an explanatory message; handler
    /// failures surface as `Err` wrapped with event context.
    async fn process(&self, event: WebhookEvent) -> Result<ProcessOutcome, Error>;
}
