//! Webhook reconciliation service.
//!
//! This is the core of the user-sync pipeline: an at-least-once,
//! out-of-order-tolerant consumer that keeps the local `synced_users`
//! projection consistent with the identity provider's event stream. Both
//! handlers are existence-gated: the authoritative upstream lookup, not
//! arrival order, is the tie-breaker when causally related events arrive
//! reordered.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::Error;
use crate::domain::event::{USER_CREATED, USER_DELETED, UserLifecycleEvent, WebhookEvent};
use crate::domain::ports::{
    IdentityProvider, ProcessOutcome, UserExistence, UserStore, UserStoreError, WebhookCommand,
};
use crate::domain::user::SyncedUser;

/// Reconciles webhook deliveries against the user store.
#[derive(Clone)]
pub struct UserSyncService<S, P> {
    store: Arc<S>,
    provider: Arc<P>,
}

impl<S, P> UserSyncService<S, P> {
    /// Create a new service over the given store and provider ports.
    pub fn new(store: Arc<S>, provider: Arc<P>) -> Self {
        Self { store, provider }
    }
}

impl<S, P> UserSyncService<S, P>
where
    S: UserStore,
    P: IdentityProvider,
{
    fn map_store_error(error: UserStoreError) -> Error {
        match error {
            UserStoreError::Connection { message } => {
                Error::service_unavailable(format!("user store unavailable: {message}"))
            }
            UserStoreError::Query { message } => {
                Error::internal(format!("user store error: {message}"))
            }
        }
    }

    /// Collapse the provider lookup into the three-way existence answer.
    ///
    /// A failed check is `Unknown`, never `Absent`: conflating the two is
    /// what would let a transient provider outage delete legitimate users.
    async fn resolve_existence(&self, event: &UserLifecycleEvent) -> UserExistence {
        match self.provider.fetch_user(&event.user.id).await {
            Ok(existence) => existence,
            Err(err) => {
                warn!(
                    workos_id = %event.user.id,
                    event_id = %event.id,
                    error = %err,
                    "existence check failed; treating upstream state as unknown"
                );
                UserExistence::Unknown {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Apply a `user.created` delivery: existence-gated upsert.
    ///
    /// Fail-open on an inconclusive check: not creating a legitimate user
    /// is the worse failure mode, and a later delete delivery (or replay)
    /// still converges the projection.
    async fn handle_user_created(&self, event: &UserLifecycleEvent) -> Result<(), Error> {
        let user = &event.user;

        match self.resolve_existence(event).await {
            UserExistence::Absent => {
                info!(
                    workos_id = %user.id,
                    email = %user.email,
                    event_id = %event.id,
                    "skipping user.created; user was already deleted upstream"
                );
                Ok(())
            }
            existence => {
                if let UserExistence::Unknown { reason } = &existence {
                    warn!(
                        workos_id = %user.id,
                        reason = %reason,
                        "existence check inconclusive; applying user.created anyway"
                    );
                }

                let record = SyncedUser::provider_managed(
                    user.id.clone(),
                    user.email.clone(),
                    user.created_at.unwrap_or(event.occurred_at),
                    user.updated_at.unwrap_or(event.occurred_at),
                );
                self.store
                    .upsert(&record)
                    .await
                    .map_err(Self::map_store_error)?;

                info!(
                    workos_id = %user.id,
                    email = %user.email,
                    "synchronized user from user.created"
                );
                Ok(())
            }
        }
    }

    /// Apply a `user.deleted` delivery: existence-gated delete.
    ///
    /// Fail-closed on an inconclusive check: deleting a user we cannot
    /// confirm is gone upstream is irreversible, so the delivery is failed
    /// and left to the provider's retry cycle instead.
    async fn handle_user_deleted(&self, event: &UserLifecycleEvent) -> Result<(), Error> {
        let user = &event.user;

        match self.resolve_existence(event).await {
            UserExistence::Exists => {
                info!(
                    workos_id = %user.id,
                    event_id = %event.id,
                    "skipping user.deleted; user still exists upstream"
                );
                Ok(())
            }
            UserExistence::Absent => {
                let deleted = self
                    .store
                    .delete_by_workos_id(&user.id)
                    .await
                    .map_err(Self::map_store_error)?;

                if deleted == 0 {
                    info!(
                        workos_id = %user.id,
                        "user.deleted was a no-op; no local record"
                    );
                } else {
                    info!(workos_id = %user.id, rows = deleted, "deleted local user");
                }
                Ok(())
            }
            UserExistence::Unknown { reason } => Err(Error::service_unavailable(format!(
                "cannot confirm upstream deletion of {}: {reason}",
                user.id
            ))),
        }
    }
}

fn wrap_handler_error(event_type: &str, error: Error) -> Error {
    let cause = error.message().to_owned();
    let wrapped = error.with_message(format!("Failed to process event {event_type}: {cause}"));
    error!(event_type, error = %wrapped, "webhook handler failed");
    wrapped
}

#[async_trait]
impl<S, P> WebhookCommand for UserSyncService<S, P>
where
    S: UserStore,
    P: IdentityProvider,
{
    async fn process(&self, event: WebhookEvent) -> Result<ProcessOutcome, Error> {
        match event {
            WebhookEvent::Unknown(unknown) => {
                info!(
                    event_id = %unknown.id,
                    event_type = %unknown.event_type,
                    "no handler found for event type"
                );
                Ok(ProcessOutcome::ignored(&unknown.event_type))
            }
            WebhookEvent::UserCreated(lifecycle) => {
                match self.handle_user_created(&lifecycle).await {
                    Ok(()) => Ok(ProcessOutcome::processed(USER_CREATED)),
                    Err(err) => Err(wrap_handler_error(USER_CREATED, err)),
                }
            }
            WebhookEvent::UserDeleted(lifecycle) => {
                match self.handle_user_deleted(&lifecycle).await {
                    Ok(()) => Ok(ProcessOutcome::processed(USER_DELETED)),
                    Err(err) => Err(wrap_handler_error(USER_DELETED, err)),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "reconciliation_tests.rs"]
mod tests;
