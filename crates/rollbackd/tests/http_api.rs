//! HTTP surface tests, driven through the axum router in-process.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{workbench, Workbench, OK_STUB};
use http_body_util::BodyExt;
use rollbackd::server::{app, AppState};
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app(bench: &Workbench) -> axum::Router {
    app(Arc::new(AppState::new(bench.config.clone())))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_rollback(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/rollback")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn root_reports_service_info() {
    let bench = workbench("ORDER_SERVICE_VERSION=v1.0\n", OK_STUB);
    let response = test_app(&bench).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "rollback-webhook");
    assert_eq!(body["environment"], "test");
    assert!(body["uptime_seconds"].as_f64().unwrap() >= 0.0);
    assert!(body["endpoints"]["POST /rollback"].is_string());
    assert!(body["endpoints"]["GET /status"].is_string());
}

#[tokio::test]
async fn health_reports_docker_available() {
    let bench = workbench("ORDER_SERVICE_VERSION=v1.0\n", OK_STUB);
    let response = test_app(&bench).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["docker_available"], true);
}

#[tokio::test]
async fn health_stays_200_when_docker_is_down() {
    let bench = workbench("ORDER_SERVICE_VERSION=v1.0\n", "exit 1\n");
    let response = test_app(&bench).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["docker_available"], false);
}

#[tokio::test]
async fn ready_all_checks_pass() {
    let bench = workbench("ORDER_SERVICE_VERSION=v1.0\n", OK_STUB);
    let response = test_app(&bench).oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["checks"]["docker"], true);
    assert_eq!(body["checks"]["env_file"], true);
    assert_eq!(body["checks"]["compose_file"], true);
}

#[tokio::test]
async fn ready_fails_when_env_file_missing() {
    let bench = workbench("ORDER_SERVICE_VERSION=v1.0\n", OK_STUB);
    fs::remove_file(&bench.config.env_file).unwrap();

    let response = test_app(&bench).oneshot(get("/ready")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ready"], false);
    assert_eq!(body["checks"]["env_file"], false);
}

#[tokio::test]
async fn status_starts_empty() {
    let bench = workbench("ORDER_SERVICE_VERSION=v1.0\n", OK_STUB);
    let response = test_app(&bench).oneshot(get("/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["last_rollback"].is_null());
    assert_eq!(body["total_rollbacks"], 0);
    assert!(body["service_uptime_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn rollback_happy_path_over_http() {
    let bench = workbench("ORDER_SERVICE_VERSION=v1.1-bad\n", OK_STUB);
    let app = test_app(&bench);

    let body = json!({
        "service": "order-service",
        "target_version": "v1.0",
        "alert_id": "slo-burn-rate-order-service",
        "alert_name": "Order Service SLO Burn Rate Alert",
        "reason": "SLO burn rate exceeded threshold"
    });
    let response = app.clone().oneshot(post_rollback(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let record = body_json(response).await;
    assert_eq!(record["status"], "COMPLETED");
    assert_eq!(record["previous_version"], "v1.1-bad");
    assert_eq!(record["target_version"], "v1.0");
    assert!(record["rollback_id"]
        .as_str()
        .unwrap()
        .starts_with("rb-"));

    let store = fs::read_to_string(&bench.config.env_file).unwrap();
    assert!(store.contains("ORDER_SERVICE_VERSION=v1.0"));

    // The same record is retained for /status.
    let response = app.oneshot(get("/status")).await.unwrap();
    let status = body_json(response).await;
    assert_eq!(status["total_rollbacks"], 1);
    assert_eq!(
        status["last_rollback"]["rollback_id"],
        record["rollback_id"]
    );
}

#[tokio::test]
async fn rollback_failure_still_answers_200() {
    let bench = workbench(
        "ORDER_SERVICE_VERSION=v1.1-bad\n",
        common::FAILING_RESTART_STUB,
    );
    let body = json!({
        "service": "order-service",
        "target_version": "v1.0",
        "alert_id": "alert-1",
        "reason": "latency"
    });
    let response = test_app(&bench)
        .oneshot(post_rollback(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let record = body_json(response).await;
    assert_eq!(record["status"], "FAILED");
    assert!(record["error"]
        .as_str()
        .unwrap()
        .contains("Container not found"));
}

#[tokio::test]
async fn invalid_service_is_422_without_side_effects() {
    let bench = workbench("ORDER_SERVICE_VERSION=v1.1-bad\n", OK_STUB);
    let app = test_app(&bench);
    let before = fs::read(&bench.config.env_file).unwrap();

    let body = json!({
        "service": "invalid-service",
        "target_version": "v1.0",
        "alert_id": "alert-1",
        "reason": "latency"
    });
    let response = app.clone().oneshot(post_rollback(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error = body_json(response).await;
    assert!(error["detail"].is_string());

    // The executor was never invoked: no file mutation, no counter change.
    assert_eq!(fs::read(&bench.config.env_file).unwrap(), before);
    let response = app.oneshot(get("/status")).await.unwrap();
    let status = body_json(response).await;
    assert_eq!(status["total_rollbacks"], 0);
    assert!(status["last_rollback"].is_null());
}

#[tokio::test]
async fn missing_required_field_is_422() {
    let bench = workbench("ORDER_SERVICE_VERSION=v1.0\n", OK_STUB);

    // No target_version.
    let body = json!({
        "service": "order-service",
        "alert_id": "alert-1",
        "reason": "latency"
    });
    let response = test_app(&bench)
        .oneshot(post_rollback(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
