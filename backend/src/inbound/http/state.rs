//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::WebhookCommand;
use crate::inbound::http::signature::SignatureVerifier;

/// Dependency bundle for the webhook HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Driving port the webhook endpoint dispatches into.
    pub webhooks: Arc<dyn WebhookCommand>,
    /// Verifier for the provider's delivery signatures.
    pub verifier: Arc<SignatureVerifier>,
}

impl HttpState {
    /// Construct state from a webhook port and a configured verifier.
    pub fn new(webhooks: Arc<dyn WebhookCommand>, verifier: SignatureVerifier) -> Self {
        Self {
            webhooks,
            verifier: Arc::new(verifier),
        }
    }
}
