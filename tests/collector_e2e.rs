//! End-to-end scenarios driving the real collector router in-process,
//! with no network socket involved (S4, S5, S6).

use std::collections::HashSet;
use std::sync::Arc;

use arecibo_collector::policy_store::PolicyStore;
use arecibo_collector::schema::SchemaRegistry;
use arecibo_collector::{AppState, Settings, build_router};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn router() -> Router {
    let settings = Settings {
        api_keys: HashSet::from(["test-key".to_string()]),
        force_go_dark: false,
        force_go_dark_on: HashSet::new(),
        policy_ttl_sec: 60,
        policy_file: None,
        host: "0.0.0.0".to_string(),
        port: 8080,
        schema_dir: "schemas".to_string(),
    };
    let schemas = SchemaRegistry::load(concat!(env!("CARGO_MANIFEST_DIR"), "/../schemas")).unwrap();
    let policy_store = PolicyStore::from_defaults_and_file(None).unwrap();
    let state = AppState { settings: Arc::new(settings), schemas: Arc::new(schemas), policy_store: Arc::new(policy_store) };
    build_router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn events(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({"ts": "2026-02-26T12:00:01Z", "type": "widget.clicked", "severity": "info", "payload": {"i": i}}))
        .collect()
}

/// S4: a batch with 1001 events is rejected with 413 before schema
/// validation even runs.
#[tokio::test]
async fn s4_oversized_batch_rejected() {
    let payload = json!({
        "schemaVersion": "1.0.0",
        "batchId": "b1",
        "agentSessionId": "s1",
        "sentAt": "2026-02-26T12:00:01Z",
        "events": events(1001),
    });

    let request = Request::builder()
        .method("POST")
        .uri("/events:batch")
        .header("Content-Type", "application/json")
        .header("X-API-Key", "test-key")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["result"]["error"]["code"], json!("batch_too_large"));
}

/// S5: an announce whose `sentAt` is not `Z`-suffixed fails schema
/// validation with 400 `validation_error`.
#[tokio::test]
async fn s5_non_z_timestamp_rejected() {
    let payload = json!({
        "schemaVersion": "1.0.0",
        "eventType": "agent.announce",
        "eventId": "e1",
        "sentAt": "2026-02-26T12:00:01+00:00",
        "identity": {
            "serviceName": "demo-service",
            "environment": "local",
            "instanceId": "i1",
            "startupTs": "2026-02-26T12:00:00Z",
            "hostname": "h1"
        },
        "runtime": {"agentPid": 1, "agentVersion": "0.1.0", "rustVersion": "0.1.0"}
    });

    let request = Request::builder()
        .method("POST")
        .uri("/announce")
        .header("Content-Type", "application/json")
        .header("X-API-Key", "test-key")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["result"]["error"]["code"], json!("validation_error"));
}

/// S6: an unknown service/environment pair returns 404
/// `policy_not_found`.
#[tokio::test]
async fn s6_unknown_service_policy_not_found() {
    let request = Request::builder()
        .method("GET")
        .uri("/policy?serviceName=nope&environment=local")
        .header("X-API-Key", "test-key")
        .body(Body::empty())
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["result"]["error"]["code"], json!("policy_not_found"));
}

/// Not part of S1-S6 but the same surface: a known policy returns a
/// bare (non-`result`-wrapped) envelope with 200.
#[tokio::test]
async fn known_policy_returns_bare_envelope_with_200() {
    let request = Request::builder()
        .method("GET")
        .uri("/policy?serviceName=demo-service&environment=local")
        .header("X-API-Key", "test-key")
        .body(Body::empty())
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["policy"]["serviceName"], json!("demo-service"));
    assert!(body.get("result").is_none());
}

/// Missing API key is rejected with 401 regardless of endpoint.
#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let request = Request::builder().method("GET").uri("/policy?serviceName=demo-service&environment=local").body(Body::empty()).unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
