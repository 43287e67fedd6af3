//! HTTP server for rollbackd.

use crate::config::Config;
use crate::rollback::RollbackExecutor;
use crate::routes;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers. Constructed once at startup
/// and torn down with the process.
pub struct AppState {
    pub executor: RollbackExecutor,
    pub config: Config,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            executor: RollbackExecutor::new(&config),
            config,
            start_time: Instant::now(),
        }
    }
}

/// Build the full router. Factored out so tests can drive the API
/// in-process without binding a socket.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::rollback_routes())
        .merge(routes::health_routes())
        .merge(routes::status_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until the process is stopped.
pub async fn run(state: AppState) -> Result<()> {
    // Webhook callers live outside the container, so bind all interfaces.
    let addr = format!("0.0.0.0:{}", state.config.port);
    let state = Arc::new(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
