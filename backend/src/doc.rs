//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the webhook endpoint and health probes. The generated document backs
//! Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, SyncedUser};
use crate::inbound::http::webhooks::WebhookAcknowledgement;

/// OpenAPI document for the user-sync HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User-sync backend API",
        description = "Webhook-driven synchronization of identity-provider users."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::webhooks::receive_webhook,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode, SyncedUser, WebhookAcknowledgement)),
    tags(
        (name = "webhooks", description = "Identity-provider event ingestion"),
        (name = "health", description = "Orchestration probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_webhook_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/webhooks/identity"));
        assert!(doc.paths.paths.contains_key("/health/ready"));
    }
}
