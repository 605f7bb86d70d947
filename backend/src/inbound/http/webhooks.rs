//! Identity-provider webhook endpoint.
//!
//! ```text
//! POST /api/v1/webhooks/identity
//! WorkOS-Signature: t=1704103200000, v1=<hex hmac>
//! {"id":"event_01","event":"user.created","createdAt":"...","data":{...}}
//! ```
//!
//! Status-code policy: non-200 is reserved for signature failures, where a
//! provider retry is useful. Business outcomes, including processing
//! failures this service controls, are acknowledged with 200 so the
//! provider does not hammer a pipeline that will log and recover on its own.

use actix_web::{HttpRequest, HttpResponse, post, web};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::event::WebhookEvent;
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::signature::SIGNATURE_HEADER;
use crate::inbound::http::state::HttpState;

/// Acknowledgement body returned for accepted deliveries.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAcknowledgement {
    /// Whether the delivery was accepted.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Provider-assigned event identifier, echoed for correlation.
    pub event_id: String,
    /// Event type string, echoed for correlation.
    pub event_type: String,
}

/// Receive and reconcile one identity-provider delivery.
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/identity",
    request_body(content = String, description = "Signed JSON delivery envelope"),
    params(
        ("WorkOS-Signature" = String, Header, description = "Delivery signature: t=<unix-millis>, v1=<hex hmac-sha256>")
    ),
    responses(
        (status = 200, description = "Delivery acknowledged", body = WebhookAcknowledgement),
        (status = 401, description = "Missing or invalid signature", body = Error)
    ),
    tags = ["webhooks"],
    operation_id = "receiveIdentityWebhook",
    security([])
)]
#[post("/webhooks/identity")]
pub async fn receive_webhook(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let Some(header) = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return Err(Error::unauthorized("Missing signature"));
    };

    if let Err(err) = state.verifier.verify(header, &body, Utc::now()) {
        warn!(error = %err, "rejected webhook delivery");
        return Err(Error::unauthorized("Invalid signature"));
    }

    let event = match WebhookEvent::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            error!(error = %err, "webhook body could not be narrowed into an event");
            return Ok(processing_failed());
        }
    };

    let event_id = event.id().to_owned();
    let event_type = event.event_type().to_owned();
    match state.webhooks.process(event).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(WebhookAcknowledgement {
            success: outcome.success,
            message: outcome.message,
            event_id,
            event_type,
        })),
        Err(err) => {
            error!(
                event_id = %event_id,
                event_type = %event_type,
                error = %err,
                "webhook processing failed"
            );
            Ok(processing_failed())
        }
    }
}

/// 200 with an error body: acknowledged, but not applied. See the module docs
/// for why failures this service controls are not surfaced as 5xx.
fn processing_failed() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "error": "Processing failed" }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test as actix_test, web};
    use chrono::{TimeDelta, Utc};
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{MockWebhookCommand, ProcessOutcome};
    use crate::inbound::http::signature::{SignatureVerifier, sign};

    const SECRET: &str = "whsec_test";

    fn test_state(webhooks: MockWebhookCommand) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(webhooks),
            SignatureVerifier::new(SECRET, TimeDelta::seconds(300)),
        ))
    }

    fn created_body() -> Vec<u8> {
        json!({
            "id": "event_01",
            "event": "user.created",
            "createdAt": "2024-01-01T10:00:00Z",
            "data": {
                "id": "user_01",
                "email": "a@x.com",
                "createdAt": "2024-01-01T10:00:00Z",
                "updatedAt": "2024-01-01T10:00:00Z"
            }
        })
        .to_string()
        .into_bytes()
    }

    async fn send(
        state: web::Data<HttpState>,
        body: Vec<u8>,
        header: Option<String>,
    ) -> (actix_web::http::StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/api/v1").service(receive_webhook)),
        )
        .await;

        let mut request = actix_test::TestRequest::post()
            .uri("/api/v1/webhooks/identity")
            .insert_header(("content-type", "application/json"))
            .set_payload(body);
        if let Some(value) = header {
            request = request.insert_header((SIGNATURE_HEADER, value));
        }

        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&bytes).expect("JSON body");
        (status, value)
    }

    #[actix_web::test]
    async fn rejects_deliveries_without_a_signature() {
        let mut webhooks = MockWebhookCommand::new();
        webhooks.expect_process().times(0);

        let (status, body) = send(test_state(webhooks), created_body(), None).await;
        assert_eq!(status, actix_web::http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Missing signature")
        );
    }

    #[actix_web::test]
    async fn rejects_deliveries_with_a_bad_signature() {
        let mut webhooks = MockWebhookCommand::new();
        webhooks.expect_process().times(0);

        let body = created_body();
        let header = sign("whsec_other", Utc::now(), &body);
        let (status, response) = send(test_state(webhooks), body, Some(header)).await;
        assert_eq!(status, actix_web::http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.get("message").and_then(Value::as_str),
            Some("Invalid signature")
        );
    }

    #[actix_web::test]
    async fn acknowledges_processed_deliveries_with_event_context() {
        let mut webhooks = MockWebhookCommand::new();
        webhooks
            .expect_process()
            .withf(|event| matches!(event, WebhookEvent::UserCreated(_)))
            .times(1)
            .return_once(|_| Ok(ProcessOutcome::processed("user.created")));

        let body = created_body();
        let header = sign(SECRET, Utc::now(), &body);
        let (status, response) = send(test_state(webhooks), body, Some(header)).await;
        assert!(status.is_success());
        assert_eq!(response.get("success").and_then(Value::as_bool), Some(true));
        assert_eq!(
            response.get("message").and_then(Value::as_str),
            Some("Successfully processed user.created")
        );
        assert_eq!(
            response.get("eventId").and_then(Value::as_str),
            Some("event_01")
        );
        assert_eq!(
            response.get("eventType").and_then(Value::as_str),
            Some("user.created")
        );
    }

    #[actix_web::test]
    async fn acknowledges_processing_failures_without_a_retryable_status() {
        let mut webhooks = MockWebhookCommand::new();
        webhooks
            .expect_process()
            .times(1)
            .return_once(|_| Err(Error::internal("store blew up")));

        let body = created_body();
        let header = sign(SECRET, Utc::now(), &body);
        let (status, response) = send(test_state(webhooks), body, Some(header)).await;
        assert!(status.is_success(), "failures we control are acknowledged");
        assert_eq!(
            response.get("error").and_then(Value::as_str),
            Some("Processing failed")
        );
    }

    #[actix_web::test]
    async fn acknowledges_undecodable_bodies_without_dispatching() {
        let mut webhooks = MockWebhookCommand::new();
        webhooks.expect_process().times(0);

        let body = b"not-json".to_vec();
        let header = sign(SECRET, Utc::now(), &body);
        let (status, response) = send(test_state(webhooks), body, Some(header)).await;
        assert!(status.is_success());
        assert_eq!(
            response.get("error").and_then(Value::as_str),
            Some("Processing failed")
        );
    }
}
