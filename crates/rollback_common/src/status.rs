//! Health, readiness and status schemas for the daemon API.

use crate::rollback::RollbackResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Deployment environment label (local or instruqt).
    pub environment: String,
    /// Result of a live probe of the orchestrator CLI.
    pub docker_available: bool,
}

/// Individual readiness probes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReadyChecks {
    pub docker: bool,
    pub env_file: bool,
    pub compose_file: bool,
}

impl ReadyChecks {
    pub fn all(&self) -> bool {
        self.docker && self.env_file && self.compose_file
    }
}

/// Readiness check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub checks: ReadyChecks,
}

/// Last rollback plus process-lifetime totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub last_rollback: Option<RollbackResponse>,
    /// Count of successful remediations (failed attempts are not counted).
    pub total_rollbacks: u64,
    pub service_uptime_seconds: f64,
}

/// Root endpoint payload: service metadata and the endpoint map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: f64,
    pub endpoints: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_checks_all() {
        let ready = ReadyChecks {
            docker: true,
            env_file: true,
            compose_file: true,
        };
        assert!(ready.all());

        let not_ready = ReadyChecks {
            docker: false,
            ..ready
        };
        assert!(!not_ready.all());
    }

    #[test]
    fn test_status_response_serializes_null_last_rollback() {
        let status = StatusResponse {
            last_rollback: None,
            total_rollbacks: 0,
            service_uptime_seconds: 1.5,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json["last_rollback"].is_null());
        assert_eq!(json["total_rollbacks"], 0);
    }
}
