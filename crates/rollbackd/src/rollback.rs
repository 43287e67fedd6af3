//! Rollback executor.
//!
//! Turns a remediation request into a version pin update plus a container
//! restart, and keeps the resulting record for /status. The sequence is
//! strictly linear: validate environment, read the current pin, write the
//! target pin, restart the service. Every failure is converted into a
//! FAILED record at its origin; the executor never returns an error to
//! its caller.

use crate::compose::{docker_info, ComposeRunner, PROBE_TIMEOUT};
use crate::config::Config;
use crate::state::ExecutorState;
use crate::version_store::VersionStore;
use chrono::{DateTime, Utc};
use rollback_common::{RollbackRequest, RollbackResponse, RollbackStatus, ServiceName};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Executes rollbacks and tracks the most recent record.
pub struct RollbackExecutor {
    store: VersionStore,
    runner: ComposeRunner,
    compose_file: PathBuf,
    env_file: PathBuf,
    docker_bin: String,
    state: RwLock<ExecutorState>,
    /// One guard per service, held across the whole
    /// validate-read-write-restart sequence. Overlapping rollbacks of the
    /// same service serialize; different services proceed independently.
    locks: HashMap<ServiceName, Mutex<()>>,
}

impl RollbackExecutor {
    pub fn new(config: &Config) -> Self {
        let locks = ServiceName::ALL
            .iter()
            .map(|s| (*s, Mutex::new(())))
            .collect();

        info!(
            "RollbackExecutor initialized with compose_file={}, env_file={}",
            config.compose_file.display(),
            config.env_file.display()
        );

        Self {
            store: VersionStore::new(&config.env_file),
            runner: ComposeRunner::new(&config.docker_bin, &config.compose_file, &config.env_file),
            compose_file: config.compose_file.clone(),
            env_file: config.env_file.clone(),
            docker_bin: config.docker_bin.clone(),
            state: RwLock::new(ExecutorState::new()),
            locks,
        }
    }

    /// Check the preconditions every rollback depends on: the version
    /// store exists, the compose file exists, and the orchestrator answers
    /// its health probe. The error names the first failed check.
    pub async fn validate_environment(&self) -> Result<(), String> {
        if !self.env_file.exists() {
            return Err(format!(
                "Environment file not found: {}",
                self.env_file.display()
            ));
        }
        if !self.compose_file.exists() {
            return Err(format!(
                "Docker Compose file not found: {}",
                self.compose_file.display()
            ));
        }
        if let Err(e) = docker_info(&self.docker_bin, PROBE_TIMEOUT).await {
            return Err(format!("Docker not available: {e}"));
        }
        Ok(())
    }

    /// The last record stored, if any rollback has run.
    pub async fn last_rollback(&self) -> Option<RollbackResponse> {
        self.state.read().await.last_rollback.clone()
    }

    /// Count of successful remediations since startup.
    pub async fn total_rollbacks(&self) -> u64 {
        self.state.read().await.total_rollbacks
    }

    /// Execute a complete rollback and return its terminal record.
    pub async fn execute_rollback(&self, request: &RollbackRequest) -> RollbackResponse {
        let trace_id = Uuid::new_v4().simple().to_string();
        let span = info_span!(
            "execute_rollback",
            rollback.service = %request.service,
            rollback.target_version = %request.target_version,
            rollback.alert_id = %request.alert_id,
            rollback.trace_id = %trace_id,
        );
        self.run_rollback(request, trace_id).instrument(span).await
    }

    async fn run_rollback(&self, request: &RollbackRequest, trace_id: String) -> RollbackResponse {
        let _guard = self.locks[&request.service].lock().await;

        let started_at = Utc::now();
        let rollback_id = format!(
            "rb-{}-{}",
            started_at.format("%Y%m%d-%H%M%S"),
            request.service
        );

        info!(
            "Starting rollback {}: {} -> {} (alert: {}, reason: {})",
            rollback_id, request.service, request.target_version, request.alert_id, request.reason
        );

        // Step 1: preconditions. Nothing has been touched yet, so a failed
        // check leaves the store exactly as it was.
        if let Err(check) = self.validate_environment().await {
            error!("Environment validation failed: {}", check);
            return self
                .finish(failed_record(
                    request,
                    &rollback_id,
                    started_at,
                    None,
                    format!("Rollback validation failed: {check}"),
                    check,
                    &trace_id,
                ))
                .await;
        }

        // Step 2: previous version, if the store knows it. Unknown does
        // not block the rollback.
        let previous_version = self.store.read_version(request.service);
        if let Some(prev) = &previous_version {
            info!("Current version of {}: {}", request.service, prev);
        }

        // Step 3: pin the target version.
        if let Err(e) = self
            .store
            .write_version(request.service, &request.target_version)
        {
            let detail = format!("Failed to update version store: {e:#}");
            error!("{}", detail);
            return self
                .finish(failed_record(
                    request,
                    &rollback_id,
                    started_at,
                    previous_version,
                    format!("Rollback failed: {detail}"),
                    detail,
                    &trace_id,
                ))
                .await;
        }

        // Step 4: restart. The store is already pinned to the target: if
        // this fails, the pin and the running container disagree until the
        // next successful restart. No compensating write-back.
        if let Err(e) = self.runner.restart_service(request.service).await {
            let detail = format!("Failed to restart service: {e}");
            error!("{}", detail);
            return self
                .finish(failed_record(
                    request,
                    &rollback_id,
                    started_at,
                    previous_version,
                    format!("Rollback failed during service restart: {e}"),
                    detail,
                    &trace_id,
                ))
                .await;
        }

        let completed_at = Utc::now();
        let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        let message = format!(
            "Successfully rolled back {} from {} to {} in {:.2} seconds",
            request.service,
            previous_version.as_deref().unwrap_or("unknown"),
            request.target_version,
            duration_seconds,
        );
        info!("{}", message);

        self.finish(RollbackResponse {
            status: RollbackStatus::Completed,
            message,
            service: request.service,
            previous_version,
            target_version: request.target_version.clone(),
            rollback_id,
            started_at,
            completed_at: Some(completed_at),
            error: None,
            trace_id: Some(trace_id),
        })
        .await
    }

    async fn finish(&self, record: RollbackResponse) -> RollbackResponse {
        self.state.write().await.record(record.clone());
        record
    }
}

fn failed_record(
    request: &RollbackRequest,
    rollback_id: &str,
    started_at: DateTime<Utc>,
    previous_version: Option<String>,
    message: String,
    error: String,
    trace_id: &str,
) -> RollbackResponse {
    RollbackResponse {
        status: RollbackStatus::Failed,
        message,
        service: request.service,
        previous_version,
        target_version: request.target_version.clone(),
        rollback_id: rollback_id.to_string(),
        started_at,
        completed_at: Some(Utc::now()),
        error: Some(error),
        trace_id: Some(trace_id.to_string()),
    }
}
