//! Process-lifetime rollback bookkeeping.
//!
//! Diagnostic only: the version store file is the source of truth, and
//! this state is lost when the daemon restarts.

use rollback_common::{RollbackResponse, RollbackStatus};

/// The most recent rollback record plus a count of successful
/// remediations. Owned by the executor inside the server's shared state,
/// never a process-global.
#[derive(Debug, Default)]
pub struct ExecutorState {
    pub last_rollback: Option<RollbackResponse>,
    pub total_rollbacks: u64,
}

impl ExecutorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a terminal record. Only COMPLETED rollbacks count toward the
    /// total; failed attempts stay visible through `last_rollback` only.
    pub fn record(&mut self, record: RollbackResponse) {
        if record.status == RollbackStatus::Completed {
            self.total_rollbacks += 1;
        }
        self.last_rollback = Some(record);
    }
}
