//! Integration tests for the anti-rule HTTP API
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.
//! Run with: cargo test --test api_tests -p antiaffinity-server

use std::sync::Arc;

use antiaffinity_scheduler::AntiRuleManager;
use antiaffinity_server::{router, ApiError, AppState, LeaderLocationResponse, ScoresResponse};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> (Router, Arc<AntiRuleManager>) {
    let manager = Arc::new(AntiRuleManager::new());
    let state = Arc::new(AppState::new(manager.clone()));
    (router(state), manager)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn put_rule(app: &Router, id: u64, start: &str, end: &str) -> (StatusCode, Vec<u8>) {
    send(
        app,
        "PUT",
        "/api/v1/anti-rules",
        Some(json!({"id": id, "start_key_hex": start, "end_key_hex": end})),
    )
    .await
}

// ============================================================================
// Rule Endpoints
// ============================================================================

#[tokio::test]
async fn test_set_and_list_rules() {
    let (app, manager) = app();

    let (status, body) = put_rule(&app, 1, "61", "7a").await;
    assert_eq!(status, StatusCode::OK);
    let message: String = serde_json::from_slice(&body).unwrap();
    assert_eq!(message, "Set anti-rule successfully.");

    let (status, _) = put_rule(&app, 2, "70", "").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/v1/anti-rules", None).await;
    assert_eq!(status, StatusCode::OK);
    let rules: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        rules,
        json!([
            {"id": 1, "start_key": "61", "end_key": "7a"},
            {"id": 2, "start_key": "70", "end_key": ""}
        ])
    );
    assert_eq!(manager.rules()[0].start_key, b"a");
}

#[tokio::test]
async fn test_camel_case_body_accepted() {
    let (app, manager) = app();
    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/anti-rules",
        Some(json!({"id": 4, "startKeyHex": "01", "endKeyHex": "02"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(manager.rule_count(), 1);
}

#[tokio::test]
async fn test_inverted_range_rejected() {
    let (app, manager) = app();

    for (start, end) in [("7a", "61"), ("61", "61")] {
        let (status, body) = put_rule(&app, 1, start, end).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.code, "INVALID_RULE");
    }
    assert_eq!(manager.rule_count(), 0);
}

#[tokio::test]
async fn test_invalid_hex_rejected() {
    let (app, manager) = app();

    let (status, body) = put_rule(&app, 1, "xyz", "7a").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: ApiError = serde_json::from_slice(&body).unwrap();
    assert_eq!(err.code, "INVALID_HEX");
    assert!(err.error.contains("start key"));

    let (status, _) = put_rule(&app, 1, "61", "7").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(manager.rule_count(), 0);
}

#[tokio::test]
async fn test_missing_end_key_is_unbounded() {
    let (app, manager) = app();
    let (status, _) = send(
        &app,
        "PUT",
        "/api/v1/anti-rules",
        Some(json!({"id": 1, "startKeyHex": "61"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let rules = manager.rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].start_key, b"a");
    assert!(rules[0].end_key.is_empty());
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let (app, manager) = app();

    let truncated = Request::builder()
        .method("PUT")
        .uri("/api/v1/anti-rules")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"id": 1, "startKeyHex": "#))
        .unwrap();
    let no_content_type = Request::builder()
        .method("PUT")
        .uri("/api/v1/anti-rules")
        .body(Body::from(r#"{"id": 1, "startKeyHex": "61"}"#))
        .unwrap();

    for request in [truncated, no_content_type] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let err: ApiError = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.code, "INVALID_REQUEST");
        assert!(!err.error.is_empty());
    }
    assert_eq!(manager.rule_count(), 0);
}

#[tokio::test]
async fn test_list_empty() {
    let (app, _) = app();
    let (status, body) = send(&app, "GET", "/api/v1/anti-rules", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));
}

// ============================================================================
// Score and Location Endpoints
// ============================================================================

#[tokio::test]
async fn test_rule_scores() {
    let (app, manager) = app();
    manager.increment_score(3, 1);
    manager.increment_score(3, 1);
    manager.increment_score(3, 2);

    let (status, body) = send(&app, "GET", "/api/v1/anti-rules/3/scores", None).await;
    assert_eq!(status, StatusCode::OK);
    let scores: ScoresResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(scores.rule_id, 3);
    assert_eq!(scores.scores.get(&1), Some(&2));
    assert_eq!(scores.scores.get(&2), Some(&1));

    let (_, body) = send(&app, "GET", "/api/v1/anti-rules/9/scores", None).await;
    let scores: ScoresResponse = serde_json::from_slice(&body).unwrap();
    assert!(scores.scores.is_empty());
}

#[tokio::test]
async fn test_leader_location() {
    let (app, manager) = app();

    let (status, _) = send(&app, "GET", "/api/v1/regions/5/leader-location", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    manager.set_leader_location(5, 2);
    let (status, body) = send(&app, "GET", "/api/v1/regions/5/leader-location", None).await;
    assert_eq!(status, StatusCode::OK);
    let location: LeaderLocationResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(location.region_id, 5);
    assert_eq!(location.store_id, 2);
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}
