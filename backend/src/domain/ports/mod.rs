//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the user store, the identity provider) and how inbound adapters drive the
//! domain. Each trait exposes strongly typed errors so adapters map their
//! failures into predictable variants instead of returning `anyhow::Result`.

mod identity_provider;
mod user_store;
mod webhook_command;

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError, UserExistence};
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{UserStore, UserStoreError};
#[cfg(test)]
pub use webhook_command::MockWebhookCommand;
pub use webhook_command::{ProcessOutcome, WebhookCommand};
