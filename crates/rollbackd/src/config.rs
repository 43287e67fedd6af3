//! Daemon configuration.
//!
//! The webhook is configured entirely through environment variables, the
//! same knobs the container image exposes. Missing or unparseable values
//! fall back to defaults with a logged warning.

use std::env;
use std::path::PathBuf;
use tracing::warn;

const ENV_FILE_VAR: &str = "ENV_FILE";
const COMPOSE_FILE_VAR: &str = "COMPOSE_FILE";
const PORT_VAR: &str = "WEBHOOK_PORT";
const ENVIRONMENT_VAR: &str = "ENVIRONMENT";
const DOCKER_BIN_VAR: &str = "DOCKER_BIN";

/// Daemon configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Version store (.env) path.
    pub env_file: PathBuf,
    /// docker-compose.yml path.
    pub compose_file: PathBuf,
    /// HTTP listen port.
    pub port: u16,
    /// Deployment environment label (local or instruqt).
    pub environment: String,
    /// Orchestrator CLI binary. Overridable for tests and podman setups.
    pub docker_bin: String,
}

fn default_env_file() -> PathBuf {
    PathBuf::from("/app/infra/.env")
}

fn default_compose_file() -> PathBuf {
    PathBuf::from("/app/infra/docker-compose.yml")
}

fn default_port() -> u16 {
    9000
}

fn default_environment() -> String {
    "local".to_string()
}

fn default_docker_bin() -> String {
    "docker".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_file: default_env_file(),
            compose_file: default_compose_file(),
            port: default_port(),
            environment: default_environment(),
            docker_bin: default_docker_bin(),
        }
    }
}

impl Config {
    /// Resolve config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve config from an arbitrary lookup, so tests can supply
    /// variables without mutating process state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup(PORT_VAR) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "Invalid {}='{}', using default {}",
                    PORT_VAR,
                    raw,
                    default_port()
                );
                default_port()
            }),
            None => default_port(),
        };

        Self {
            env_file: lookup(ENV_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_env_file),
            compose_file: lookup(COMPOSE_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_compose_file),
            port,
            environment: lookup(ENVIRONMENT_VAR).unwrap_or_else(default_environment),
            docker_bin: lookup(DOCKER_BIN_VAR).unwrap_or_else(default_docker_bin),
        }
    }
}
