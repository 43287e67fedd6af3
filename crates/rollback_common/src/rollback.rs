//! Rollback request and record schemas.

use crate::service::ServiceName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a rollback attempt.
///
/// `InProgress` exists for external reporting tools that may poll
/// mid-flight; the executor itself runs synchronously and only ever
/// returns the terminal `Completed` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RollbackStatus {
    Initiated,
    InProgress,
    Completed,
    Failed,
}

/// Webhook payload sent by the alerting system when a latency or SLO
/// burn-rate alert fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackRequest {
    /// Service to roll back.
    pub service: ServiceName,
    /// Version to pin, e.g. "v1.0".
    pub target_version: String,
    /// Alert rule that triggered this rollback.
    pub alert_id: String,
    /// Human-readable alert name, for logging.
    #[serde(default)]
    pub alert_name: Option<String>,
    /// Why the rollback was requested, e.g. "SLO burn rate exceeded".
    pub reason: String,
    /// When the alert fired.
    #[serde(default)]
    pub triggered_at: Option<DateTime<Utc>>,
    /// Free-form context from the alert (burn rates, thresholds, ...).
    #[serde(default)]
    pub additional_context: Option<serde_json::Value>,
}

/// Terminal record of one rollback attempt.
///
/// Returned from POST /rollback and retained as the "last rollback" for
/// GET /status. Callers check `status`, not the HTTP code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackResponse {
    pub status: RollbackStatus,
    /// Human-readable summary of the outcome.
    pub message: String,
    pub service: ServiceName,
    /// Version pinned before this rollback, if the store knew it.
    pub previous_version: Option<String>,
    pub target_version: String,
    /// Identifier of the form `rb-<YYYYmmdd-HHMMSS>-<service>`.
    pub rollback_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Failure detail when status is FAILED.
    pub error: Option<String>,
    /// Correlation id linking the record to the daemon's log spans.
    pub trace_id: Option<String>,
}
