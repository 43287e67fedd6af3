//! Rollback webhook daemon.
//!
//! Receives webhook calls from the alerting system and performs automated
//! rollbacks: pins a service version in the compose .env file, then
//! restarts that one service through the compose CLI.

use anyhow::Result;
use rollbackd::config::Config;
use rollbackd::server::{self, AppState};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .init();

    let config = Config::from_env();
    info!("rollback-webhook v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  environment:  {}", config.environment);
    info!("  port:         {}", config.port);
    info!("  compose file: {}", config.compose_file.display());
    info!("  env file:     {}", config.env_file.display());

    let state = AppState::new(config);

    // One validation pass at startup so broken setups surface early. The
    // daemon still serves on failure; individual rollbacks will fail.
    match state.executor.validate_environment().await {
        Ok(()) => info!("Environment validation: PASSED"),
        Err(e) => {
            warn!("Environment validation: FAILED - {}", e);
            warn!("Service will start but rollbacks may fail");
        }
    }

    server::run(state).await
}
