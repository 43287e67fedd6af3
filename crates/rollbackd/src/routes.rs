//! API routes for the rollback webhook.

use crate::compose::docker_available;
use crate::server::AppState;
use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rollback_common::{
    HealthResponse, ReadyChecks, ReadyResponse, RollbackRequest, RollbackResponse, RollbackStatus,
    ServiceInfo, StatusResponse, VERSION,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

const SERVICE_NAME: &str = "rollback-webhook";

// ============================================================================
// Rollback Routes
// ============================================================================

pub fn rollback_routes() -> Router<AppStateArc> {
    Router::new().route("/rollback", post(trigger_rollback))
}

/// Trigger a rollback. Called by the alerting system's webhook action.
///
/// Malformed bodies and unknown services are rejected with 422 before the
/// executor is touched. Executed rollbacks always answer 200, FAILED
/// included, so automated callers get a parseable body and branch on the
/// record's `status` field.
async fn trigger_rollback(
    State(state): State<AppStateArc>,
    payload: Result<Json<RollbackRequest>, JsonRejection>,
) -> Result<Json<RollbackResponse>, (StatusCode, Json<serde_json::Value>)> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected rollback request: {}", rejection.body_text());
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": rejection.body_text() })),
        )
    })?;

    info!(
        "Received rollback request for {} -> {}",
        request.service, request.target_version
    );

    let response = state.executor.execute_rollback(&request).await;

    match response.status {
        RollbackStatus::Failed => {
            error!(
                "Rollback {} failed: {}",
                response.rollback_id,
                response.error.as_deref().unwrap_or("unknown error")
            );
        }
        _ => {
            info!(
                "Rollback {} completed: {}",
                response.rollback_id, response.message
            );
        }
    }

    Ok(Json(response))
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        environment: state.config.environment.clone(),
        docker_available: docker_available(&state.config.docker_bin).await,
    })
}

async fn readiness_check(State(state): State<AppStateArc>) -> Json<ReadyResponse> {
    let checks = ReadyChecks {
        docker: docker_available(&state.config.docker_bin).await,
        env_file: state.config.env_file.exists(),
        compose_file: state.config.compose_file.exists(),
    };

    Json(ReadyResponse {
        ready: checks.all(),
        checks,
    })
}

// ============================================================================
// Status Routes
// ============================================================================

pub fn status_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(service_info))
        .route("/status", get(get_status))
}

async fn get_status(State(state): State<AppStateArc>) -> Json<StatusResponse> {
    Json(StatusResponse {
        last_rollback: state.executor.last_rollback().await,
        total_rollbacks: state.executor.total_rollbacks().await,
        service_uptime_seconds: state.start_time.elapsed().as_secs_f64(),
    })
}

async fn service_info(State(state): State<AppStateArc>) -> Json<ServiceInfo> {
    let mut endpoints = BTreeMap::new();
    endpoints.insert("POST /rollback".to_string(), "Trigger a rollback".to_string());
    endpoints.insert("GET /health".to_string(), "Health check".to_string());
    endpoints.insert("GET /ready".to_string(), "Readiness check".to_string());
    endpoints.insert(
        "GET /status".to_string(),
        "Last rollback status".to_string(),
    );

    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        environment: state.config.environment.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        endpoints,
    })
}
