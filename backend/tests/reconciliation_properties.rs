//! End-to-end properties of the reconciliation pipeline over in-memory ports:
//! idempotence, convergence under reordering, unknown-type tolerance, and
//! concurrent duplicate deliveries.

mod support;

use std::sync::Arc;

use serde_json::json;

use backend::domain::event::WebhookEvent;
use backend::domain::ports::{UserExistence, UserStore, WebhookCommand};
use backend::domain::reconciliation::UserSyncService;
use backend::domain::user::WorkosUserId;

use support::{InMemoryUserStore, ScriptedIdentityProvider};

type Harness = (
    Arc<InMemoryUserStore>,
    Arc<ScriptedIdentityProvider>,
    UserSyncService<InMemoryUserStore, ScriptedIdentityProvider>,
);

fn harness(initial: UserExistence) -> Harness {
    let store = Arc::new(InMemoryUserStore::default());
    let provider = Arc::new(ScriptedIdentityProvider::answering(Ok(initial)));
    let service = UserSyncService::new(Arc::clone(&store), Arc::clone(&provider));
    (store, provider, service)
}

fn created_event(event_id: &str, occurred_at: &str, email: &str) -> WebhookEvent {
    WebhookEvent::from_value(json!({
        "id": event_id,
        "event": "user.created",
        "createdAt": occurred_at,
        "data": {
            "id": "w1",
            "email": email,
            "createdAt": occurred_at,
            "updatedAt": occurred_at
        }
    }))
    .expect("well-formed create event")
}

fn deleted_event(event_id: &str, occurred_at: &str) -> WebhookEvent {
    WebhookEvent::from_value(json!({
        "id": event_id,
        "event": "user.deleted",
        "createdAt": occurred_at,
        "data": {
            "id": "w1",
            "email": "a@x.com",
            "createdAt": "2024-01-01T10:00:00Z",
            "updatedAt": occurred_at
        }
    }))
    .expect("well-formed delete event")
}

fn workos_id() -> WorkosUserId {
    WorkosUserId::new("w1").expect("valid id")
}

#[tokio::test]
async fn repeated_creates_leave_exactly_one_row() {
    let (store, _provider, service) = harness(UserExistence::Exists);

    for _ in 0..3 {
        service
            .process(created_event("e1", "2024-01-01T10:00:00Z", "a@x.com"))
            .await
            .expect("create processed");
    }

    assert_eq!(store.len(), 1);
    let row = store
        .find_by_workos_id(&workos_id())
        .await
        .expect("lookup succeeds")
        .expect("row present");
    assert_eq!(row.email, "a@x.com");
    assert!(row.password.is_none());
}

#[tokio::test]
async fn repeated_deletes_leave_zero_rows_and_never_fail() {
    let (store, provider, service) = harness(UserExistence::Exists);
    service
        .process(created_event("e1", "2024-01-01T10:00:00Z", "a@x.com"))
        .await
        .expect("seed create processed");

    provider.set(Ok(UserExistence::Absent));
    for _ in 0..3 {
        service
            .process(deleted_event("e2", "2024-01-01T11:00:00Z"))
            .await
            .expect("delete processed");
    }

    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn delete_wins_regardless_of_arrival_order() {
    // True final upstream state: the user is gone. Both arrival orders must
    // converge to "row absent".
    for create_first in [true, false] {
        let (store, provider, service) = harness(UserExistence::Absent);

        let create = created_event("e1", "2024-01-01T10:00:00Z", "a@x.com");
        let delete = deleted_event("e2", "2024-01-01T11:00:00Z");

        if create_first {
            // The upstream check reflects the final state even while the
            // create is being applied: the user is already deleted.
            provider.set(Ok(UserExistence::Absent));
            service.process(create).await.expect("create processed");
            service.process(delete).await.expect("delete processed");
        } else {
            provider.set(Ok(UserExistence::Absent));
            service.process(delete).await.expect("delete processed");
            service.process(create).await.expect("create processed");
        }

        assert_eq!(
            store.len(),
            0,
            "store must converge to absent (create_first = {create_first})"
        );
    }
}

#[tokio::test]
async fn create_wins_when_the_user_still_exists_upstream() {
    for delete_first in [true, false] {
        let (store, provider, service) = harness(UserExistence::Exists);

        let delete = deleted_event("e1", "2024-01-01T10:00:00Z");
        let create = created_event("e2", "2024-01-01T11:00:00Z", "b@x.com");

        provider.set(Ok(UserExistence::Exists));
        if delete_first {
            service.process(delete).await.expect("stale delete skipped");
            service.process(create).await.expect("create processed");
        } else {
            service.process(create).await.expect("create processed");
            service.process(delete).await.expect("stale delete skipped");
        }

        let row = store
            .find_by_workos_id(&workos_id())
            .await
            .expect("lookup succeeds")
            .expect("row present in both arrival orders");
        assert_eq!(row.email, "b@x.com");
    }
}

#[tokio::test]
async fn unknown_event_types_are_acknowledged_without_mutation() {
    let (store, _provider, service) = harness(UserExistence::Exists);

    let event = WebhookEvent::from_value(json!({
        "id": "e9",
        "event": "unknown.event",
        "createdAt": "2024-01-01T10:00:00Z",
        "data": {}
    }))
    .expect("unknown event parses");

    let outcome = service.process(event).await.expect("unknown accepted");
    assert!(outcome.success);
    assert_eq!(
        outcome.message,
        "No handler found for event type: unknown.event"
    );
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn concurrent_duplicate_creates_yield_one_row() {
    let (store, _provider, service) = harness(UserExistence::Exists);
    let service = Arc::new(service);

    let deliveries = (0..3).map(|_| {
        let service = Arc::clone(&service);
        let event = created_event("e1", "2024-01-01T10:00:00Z", "a@x.com");
        tokio::spawn(async move { service.process(event).await })
    });

    for handle in deliveries {
        handle
            .await
            .expect("delivery task completes")
            .expect("create processed");
    }

    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn concrete_scenario_from_the_event_stream() {
    // e1 creates w1 while the user exists upstream; e2 deletes it once the
    // provider confirms absence.
    let (store, provider, service) = harness(UserExistence::Exists);

    service
        .process(created_event("e1", "2024-01-01T10:00:00Z", "a@x.com"))
        .await
        .expect("e1 processed");

    let row = store
        .find_by_workos_id(&workos_id())
        .await
        .expect("lookup succeeds")
        .expect("row present after e1");
    assert_eq!(row.workos_id.as_str(), "w1");
    assert_eq!(row.email, "a@x.com");
    assert!(row.password.is_none());

    provider.set(Ok(UserExistence::Absent));
    service
        .process(deleted_event("e2", "2024-01-01T12:00:00Z"))
        .await
        .expect("e2 processed");

    assert_eq!(store.len(), 0);
}
