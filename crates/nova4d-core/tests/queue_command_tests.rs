#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{CountingStore, RejectRoutes};
use nova4d_core::coerce::clamp_priority;
use nova4d_core::errors::NovaError;
use nova4d_core::gateway::{CommandGateway, QueueRequest, QueueResponse};
use nova4d_core::model::{Metadata, Payload};
use nova4d_core::ops::CommandStore;
use nova4d_core_types::RequestContext;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn gateway(store: Arc<CountingStore>) -> CommandGateway {
    CommandGateway::new(store as Arc<dyn CommandStore>)
}

#[test]
fn test_unknown_route_never_touches_store() {
    let store = Arc::new(CountingStore::default());
    let gateway = gateway(store.clone());

    let err = gateway
        .queue_command(
            "/nova4d/not/real",
            QueueRequest::new(Payload::new()),
            Payload::new(),
            &RequestContext::new(),
        )
        .unwrap_err();

    assert!(matches!(err, NovaError::RouteNotFound { .. }));
    assert_eq!(store.calls(), 0);
}

#[test]
fn test_validation_failure_never_touches_store() {
    let store = Arc::new(CountingStore::default());
    let gateway = gateway(store.clone());

    let request = QueueRequest::new(Payload::new().with("target_name", "Cube"));
    let result = gateway.queue_command(
        "/nova4d/material/assign",
        request,
        Payload::new(),
        &RequestContext::new(),
    );

    match &result {
        Err(NovaError::ValidationFailed { route, errors }) => {
            assert_eq!(route, "/nova4d/material/assign");
            assert_eq!(errors, &vec!["missing required field: material_name".to_string()]);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
    assert_eq!(store.calls(), 0);

    let response = serde_json::to_value(QueueResponse::from(result)).unwrap();
    assert_eq!(response["status"], "error");
    assert_eq!(response["error"], "payload validation failed");
    assert_eq!(response["details"][0], "missing required field: material_name");
}

#[test]
fn test_success_enqueues_exactly_once() {
    let store = Arc::new(CountingStore::default());
    let gateway = gateway(store.clone());
    let ctx = RequestContext::new().with_requested_by("ui:panel");

    let request = QueueRequest::new(
        Payload::new()
            .with("target_name", "Cube")
            .with("material_name", "Draft"),
    )
    .with_priority("999")
    .with_metadata(Metadata::new().with("source", "test"))
    .with_client_hint("");

    let ack = gateway
        .queue_command(
            "/nova4d/material/assign",
            request,
            Payload::new().with("material_name", "Final"),
            &ctx,
        )
        .unwrap();

    assert_eq!(store.calls(), 1);
    assert_eq!(ack.route, "/nova4d/material/assign");
    assert_eq!(ack.action, "assign-material");
    assert_eq!(ack.category, "material");

    let command = store.inner.get(&ack.command_id).unwrap();
    assert_eq!(command.priority, 100);
    assert_eq!(command.payload.get("material_name"), Some(&json!("Final")));
    assert_eq!(command.metadata.get("source"), Some(&json!("test")));
    assert_eq!(command.metadata.get("requested_by"), Some(&json!("ui:panel")));
    assert_eq!(command.metadata.get("client_hint"), Some(&json!(null)));
}

#[test]
fn test_requested_by_defaults_to_api() {
    let store = Arc::new(CountingStore::default());
    let gateway = gateway(store.clone());

    let ack = gateway
        .queue_command(
            "/nova4d/test/ping",
            QueueRequest::new(Payload::new()).with_client_hint("cinema4d-live"),
            Payload::new(),
            &RequestContext::new(),
        )
        .unwrap();

    let command = store.inner.get(&ack.command_id).unwrap();
    assert_eq!(command.metadata.get("requested_by"), Some(&json!("api")));
    assert_eq!(command.metadata.get("client_hint"), Some(&json!("cinema4d-live")));
}

#[test]
fn test_store_failure_propagates() {
    let store = Arc::new(CountingStore::failing());
    let gateway = gateway(store.clone());

    let err = gateway
        .queue_command(
            "/nova4d/test/ping",
            QueueRequest::new(Payload::new()),
            Payload::new(),
            &RequestContext::new(),
        )
        .unwrap_err();

    assert!(matches!(err, NovaError::Internal { .. }));
    assert_eq!(store.calls(), 1);
}

#[test]
fn test_custom_validator_is_consulted() {
    let store = Arc::new(CountingStore::default());
    let gateway = gateway(store.clone())
        .with_validator(Arc::new(RejectRoutes(vec!["/nova4d/test/ping"])));

    let err = gateway
        .queue_command(
            "/nova4d/test/ping",
            QueueRequest::new(Payload::new()),
            Payload::new(),
            &RequestContext::new(),
        )
        .unwrap_err();

    assert_eq!(
        err,
        NovaError::ValidationFailed {
            route: "/nova4d/test/ping".to_string(),
            errors: vec!["rejected: /nova4d/test/ping".to_string()],
        }
    );
    assert_eq!(store.calls(), 0);
}

proptest! {
    #[test]
    fn prop_numeric_priority_is_clamped(p in any::<i64>()) {
        let clamped = clamp_priority(Some(&json!(p)));
        prop_assert!((-100..=100).contains(&clamped));
        prop_assert_eq!(clamped, p.clamp(-100, 100));
    }

    #[test]
    fn prop_non_numeric_priority_is_zero(s in "[a-zA-Z_ ]{0,12}") {
        prop_assert_eq!(clamp_priority(Some(&json!(s))), 0);
    }

    #[test]
    fn prop_queued_priority_in_range(p in -10_000i64..10_000) {
        let store = Arc::new(CountingStore::default());
        let gateway = gateway(store.clone());
        let ack = gateway
            .queue_command(
                "/nova4d/test/ping",
                QueueRequest::new(Payload::new()).with_priority(p),
                Payload::new(),
                &RequestContext::new(),
            )
            .unwrap();
        let command = store.inner.get(&ack.command_id).unwrap();
        prop_assert!((-100..=100).contains(&command.priority));
    }
}
