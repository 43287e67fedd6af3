//! Compose CLI launcher.
//!
//! Shells out to the container orchestrator to restart a single service
//! with bounded wait times. The compose v2 plugin is probed on every call
//! (restarts are operator-triggered, not hot-path); a failed probe falls
//! back to the standalone docker-compose binary.

use rollback_common::ServiceName;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

/// Overall restart budget. Image pulls and container starts legitimately
/// take tens of seconds.
pub const RESTART_TIMEOUT: Duration = Duration::from_secs(60);

/// Budget for the orchestrator probes run before a restart.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Budget for the liveness probes behind /health and /ready.
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Standalone v1 binary used when the compose plugin probe fails.
const LEGACY_COMPOSE_BIN: &str = "docker-compose";

/// Why a restart failed.
///
/// The Display form carries the raw subprocess detail; for `NonZeroExit`
/// it is the captured stderr alone, so records embed the same text the
/// restart command produced.
#[derive(Debug, Error)]
pub enum RestartError {
    /// The orchestrator CLI binary is missing from the host.
    #[error("compose CLI not found: {0}")]
    CliNotFound(String),
    /// The restart command ran and exited non-zero.
    #[error("{stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
    /// The restart did not finish inside `RESTART_TIMEOUT`.
    #[error("Timeout while restarting {0}")]
    Timeout(ServiceName),
    /// The command could not be spawned at all.
    #[error("Error restarting {service}: {detail}")]
    Launch {
        service: ServiceName,
        detail: String,
    },
}

/// Which compose frontend answered the probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeCli {
    /// `docker compose` plugin (v2).
    Modern { docker_bin: String },
    /// Standalone `docker-compose` (v1).
    Legacy,
}

impl ComposeCli {
    /// Program plus leading args for a compose invocation.
    pub fn command(&self) -> (String, Vec<String>) {
        match self {
            ComposeCli::Modern { docker_bin } => {
                (docker_bin.clone(), vec!["compose".to_string()])
            }
            ComposeCli::Legacy => (LEGACY_COMPOSE_BIN.to_string(), Vec::new()),
        }
    }
}

/// Runs compose restarts against one compose file + env file pair.
#[derive(Debug, Clone)]
pub struct ComposeRunner {
    docker_bin: String,
    compose_file: PathBuf,
    env_file: PathBuf,
}

impl ComposeRunner {
    pub fn new(
        docker_bin: impl Into<String>,
        compose_file: impl Into<PathBuf>,
        env_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            docker_bin: docker_bin.into(),
            compose_file: compose_file.into(),
            env_file: env_file.into(),
        }
    }

    /// Probe for the compose v2 plugin, falling back to the standalone v1
    /// binary when it does not answer within the probe budget.
    pub async fn detect_cli(&self) -> ComposeCli {
        match run_with_timeout(&self.docker_bin, &["compose", "version"], PROBE_TIMEOUT).await {
            Ok(_) => ComposeCli::Modern {
                docker_bin: self.docker_bin.clone(),
            },
            Err(e) => {
                warn!(
                    "compose plugin probe failed ({}), falling back to {}",
                    e.detail(),
                    LEGACY_COMPOSE_BIN
                );
                ComposeCli::Legacy
            }
        }
    }

    /// Restart one service without disturbing its siblings
    /// (`up -d --no-deps <service>`). Success returns the captured stdout.
    pub async fn restart_service(&self, service: ServiceName) -> Result<String, RestartError> {
        let cli = self.detect_cli().await;
        let (program, mut args) = cli.command();
        args.extend([
            "-f".to_string(),
            self.compose_file.display().to_string(),
            "--env-file".to_string(),
            self.env_file.display().to_string(),
            "up".to_string(),
            "-d".to_string(),
            "--no-deps".to_string(),
            service.as_str().to_string(),
        ]);

        info!("Executing: {} {}", program, args.join(" "));

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        match run_with_timeout(&program, &arg_refs, RESTART_TIMEOUT).await {
            Ok(stdout) => {
                info!("Successfully restarted {}", service);
                Ok(stdout)
            }
            Err(RunFailure::NotFound(detail)) => Err(RestartError::CliNotFound(detail)),
            Err(RunFailure::NonZero { code, stderr }) => {
                Err(RestartError::NonZeroExit { code, stderr })
            }
            Err(RunFailure::TimedOut) => Err(RestartError::Timeout(service)),
            Err(RunFailure::Io(detail)) => Err(RestartError::Launch { service, detail }),
        }
    }
}

/// Probe the orchestrator daemon with `<bin> info`. `Ok(())` means it
/// answered successfully within the budget.
pub async fn docker_info(docker_bin: &str, limit: Duration) -> Result<(), String> {
    match run_with_timeout(docker_bin, &["info"], limit).await {
        Ok(_) => Ok(()),
        Err(failure) => Err(failure.detail()),
    }
}

/// Liveness view of the probe, used by /health and /ready.
pub async fn docker_available(docker_bin: &str) -> bool {
    docker_info(docker_bin, HEALTH_PROBE_TIMEOUT).await.is_ok()
}

/// Outcome of one bounded subprocess run.
#[derive(Debug)]
enum RunFailure {
    NotFound(String),
    NonZero { code: Option<i32>, stderr: String },
    TimedOut,
    Io(String),
}

impl RunFailure {
    fn detail(&self) -> String {
        match self {
            RunFailure::NotFound(d) => d.clone(),
            RunFailure::NonZero { stderr, .. } => stderr.trim().to_string(),
            RunFailure::TimedOut => "probe timed out".to_string(),
            RunFailure::Io(d) => d.clone(),
        }
    }
}

/// Run a command with captured output and a hard deadline.
///
/// `kill_on_drop` reaps the child if the deadline fires while it is still
/// running.
async fn run_with_timeout(
    program: &str,
    args: &[&str],
    limit: Duration,
) -> Result<String, RunFailure> {
    let pending = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match timeout(limit, pending).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RunFailure::NotFound(format!("{program}: {e}")));
        }
        Ok(Err(e)) => return Err(RunFailure::Io(e.to_string())),
        Err(_) => return Err(RunFailure::TimedOut),
    };

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(RunFailure::NonZero {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
