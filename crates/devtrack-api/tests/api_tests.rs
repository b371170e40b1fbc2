//! Integration tests for the API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, backed by the in-process event store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use devtrack_api::router::build_router;
use devtrack_api::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

fn router(state: &Arc<AppState>) -> Router {
    build_router(Arc::clone(state))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let response = router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post_json(state: &Arc<AppState>, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = router(state)
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn initialized_state() -> Arc<AppState> {
    let state = Arc::new(AppState::in_memory());
    let (status, json) = get(&state, "/init").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "initialized");
    state
}

async fn ingest(state: &Arc<AppState>, event: &Value) -> Value {
    let (status, json) = post_json(state, "/ingest", &event.to_string()).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    json
}

async fn seed_acceptance_events(state: &Arc<AppState>) {
    for event in [
        json!({
            "timestamp": "2024-05-01T09:00:00Z",
            "source": "Shell",
            "event_type": "command",
            "data": {"command": "cargo build"}
        }),
        json!({
            "timestamp": "2024-05-01T09:05:00Z",
            "source": "Shell",
            "event_type": "command",
            "data": {"command": "git status"}
        }),
        json!({
            "timestamp": "2024-05-01T09:10:00Z",
            "source": "ClaudeHook",
            "event_type": "tool_use",
            "data": {"tool": "Edit"}
        }),
        json!({
            "timestamp": "2024-05-01T09:15:00Z",
            "source": "LogFile",
            "event_type": "error",
            "data": {"message": "Failed to connect to database"}
        }),
    ] {
        ingest(state, &event).await;
    }
}

fn array_len(json: &Value) -> usize {
    json.as_array().map_or(usize::MAX, Vec::len)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_banner() {
    let state = Arc::new(AppState::in_memory());
    let response = router(&state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Development Event Tracker API");
}

#[tokio::test]
async fn test_acceptance_scenario() {
    let state = initialized_state().await;
    seed_acceptance_events(&state).await;

    let (status, all) = get(&state, "/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(array_len(&all), 4);
    assert_eq!(all[0]["source"], "LogFile");
    assert_eq!(all[3]["data"]["command"], "cargo build");

    let (_, shell) = get(&state, "/events?source=Shell").await;
    assert_eq!(array_len(&shell), 2);

    let (_, database) = get(&state, "/events?q=database").await;
    assert_eq!(array_len(&database), 1);
    assert_eq!(database[0]["source"], "LogFile");

    let (_, hook) = get(&state, "/events?source=ClaudeHook").await;
    assert_eq!(array_len(&hook), 1);
}

#[tokio::test]
async fn test_events_expose_wire_fields() {
    let state = initialized_state().await;
    seed_acceptance_events(&state).await;

    let (_, events) = get(&state, "/events?event_type=tool_use").await;
    let event = &events[0];
    assert_eq!(event["timestamp"], "2024-05-01T09:10:00Z");
    assert_eq!(event["source"], "ClaudeHook");
    assert_eq!(event["event_type"], "tool_use");
    assert_eq!(event["data"]["tool"], "Edit");
    assert_eq!(event["id"], 3);
}

#[tokio::test]
async fn test_filters_combine_and_blank_params_are_ignored() {
    let state = initialized_state().await;
    seed_acceptance_events(&state).await;

    let (_, combined) = get(&state, "/events?source=Shell&event_type=command&q=GIT").await;
    assert_eq!(array_len(&combined), 1);
    assert_eq!(combined[0]["data"]["command"], "git status");

    let (_, blank) = get(&state, "/events?source=&event_type=&q=").await;
    assert_eq!(array_len(&blank), 4);

    let (status, none) = get(&state, "/events?q=databasex").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn test_ingest_returns_assigned_id() {
    let state = initialized_state().await;
    let first = ingest(
        &state,
        &json!({"timestamp": "2024-01-01T00:00:00Z", "source": "Shell", "event_type": "command", "data": {}}),
    )
    .await;
    let second = ingest(
        &state,
        &json!({"id": 77, "timestamp": "2024-01-01T00:00:00Z", "source": "Shell", "event_type": "command", "data": null}),
    )
    .await;

    assert_eq!(first, json!({"status": "ingested", "id": 1}));
    assert_eq!(second["id"], 2);
}

#[tokio::test]
async fn test_ingest_without_content_type() {
    let state = initialized_state().await;
    let response = router(&state)
        .oneshot(
            Request::post("/ingest")
                .body(Body::from(
                    r#"{"timestamp":"2024-01-01T00:00:00Z","source":"Shell","event_type":"command","data":{}}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ingest_validation_errors_are_bad_requests() {
    let state = initialized_state().await;

    let (status, json) = post_json(
        &state,
        "/ingest",
        r#"{"timestamp":"2024-01-01T00:00:00Z","event_type":"command","data":{}}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("source"));

    let (status, _) = post_json(
        &state,
        "/ingest",
        r#"{"timestamp":"last tuesday","source":"Shell","event_type":"command","data":{}}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(&state, "/ingest", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, events) = get(&state, "/events").await;
    assert_eq!(events, json!([]));
}

#[tokio::test]
async fn test_uninitialized_store_is_a_conflict() {
    let state = Arc::new(AppState::in_memory());
    let (status, json) = get(&state, "/events").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("/init"));
}

#[tokio::test]
async fn test_init_wipes_events_and_restarts_ids() {
    let state = initialized_state().await;
    seed_acceptance_events(&state).await;

    let (status, json) = post_json(&state, "/init", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "initialized");

    let (_, events) = get(&state, "/events").await;
    assert_eq!(events, json!([]));

    let ack = ingest(
        &state,
        &json!({"timestamp": "2024-01-01T00:00:00Z", "source": "Shell", "event_type": "command", "data": {}}),
    )
    .await;
    assert_eq!(ack["id"], 1);
}

#[tokio::test]
async fn test_health_reports_store_status() {
    let state = Arc::new(AppState::in_memory());
    let (status, json) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["initialized"], false);
    assert_eq!(json["backend"], "memory");

    let state = initialized_state().await;
    seed_acceptance_events(&state).await;
    let (_, json) = get(&state, "/health").await;
    assert_eq!(json["initialized"], true);
    assert_eq!(json["events"], 4);
}

#[tokio::test]
async fn test_bare_options_is_acknowledged() {
    let state = Arc::new(AppState::in_memory());
    let response = router(&state)
        .oneshot(
            Request::options("/ingest")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_cors_preflight() {
    let state = Arc::new(AppState::in_memory());
    let response = router(&state)
        .oneshot(
            Request::options("/ingest")
                .header("origin", "http://localhost:3000")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let state = Arc::new(AppState::in_memory());
    let (status, json) = get(&state, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_search_matches_quotes_and_backslashes() {
    let state = initialized_state().await;
    ingest(
        &state,
        &json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "source": "Shell",
            "event_type": "command",
            "data": {"path": "C:\\tmp", "msg": "say \"hi\""}
        }),
    )
    .await;

    let (_, backslash) = get(&state, "/events?q=C:%5Ctmp").await;
    assert_eq!(array_len(&backslash), 1);

    let (_, quoted) = get(&state, "/events?q=say%20%22hi%22").await;
    assert_eq!(array_len(&quoted), 1);
    assert_eq!(quoted[0]["data"]["msg"], "say \"hi\"");
}

#[tokio::test]
async fn test_ingest_rejects_non_object_bodies() {
    let state = initialized_state().await;

    let (status, json) = post_json(
        &state,
        "/ingest",
        r#"["2024-01-01T00:00:00Z","Shell","command",{"k":"v"}]"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("array"));

    let (status, _) = post_json(&state, "/ingest", "\"event\"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, events) = get(&state, "/events").await;
    assert_eq!(events, json!([]));
}

#[tokio::test]
async fn test_ingest_rejects_nul_characters() {
    let state = initialized_state().await;
    let (status, json) = post_json(
        &state,
        "/ingest",
        r#"{"timestamp":"2024-01-01T00:00:00Z","source":"Shell","event_type":"command","data":{"out":"a\u0000b"}}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("NUL"));
}

#[tokio::test]
async fn test_ingest_accepts_compact_offsets() {
    let state = initialized_state().await;
    ingest(
        &state,
        &json!({"timestamp": "2024-03-01T12:00:00+0200", "source": "Shell", "event_type": "command", "data": {}}),
    )
    .await;

    let (_, events) = get(&state, "/events").await;
    assert_eq!(events[0]["timestamp"], "2024-03-01T10:00:00Z");
}

#[tokio::test]
async fn test_malformed_query_string_is_json_400() {
    let state = initialized_state().await;
    let (status, json) = get(&state, "/events?source=a&source=b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("query string"));
}
