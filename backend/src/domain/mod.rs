//! Domain primitives, events, and the reconciliation core.
//!
//! Purpose: keep the webhook-processing logic transport agnostic. Inbound
//! adapters narrow untrusted JSON into [`event::WebhookEvent`] before calling
//! the service; driven adapters live behind the traits in [`ports`].
//!
//! Public surface:
//! - `Error` / `ErrorCode` - transport-agnostic failure payload.
//! - `event::WebhookEvent` - typed union of inbound deliveries.
//! - `reconciliation::UserSyncService` - the existence-gated dispatcher.
//! - `user::SyncedUser` - the local projection of a provider user.

pub mod error;
pub mod event;
pub mod ports;
pub mod reconciliation;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::user::{SyncedUser, WorkosUserId, WorkosUserIdValidationError};
