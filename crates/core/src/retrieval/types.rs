//! Types for the retrieval orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::stats::RetrievalStats;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A run is already in progress on this orchestrator.
    #[error("a retrieval run is already in progress")]
    AlreadyRunning,
}

/// Notifications emitted to the progress collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RetrievalEvent {
    /// Periodic progress while submitting.
    Progress {
        /// Subjects of this run that have not settled yet.
        remaining: usize,
        /// Requests waiting in the dispatcher queue.
        queued: usize,
    },
    /// The run has drained and counters were recomputed.
    Completed(RetrievalStats),
}

/// Summary of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Subjects without a result when the run started.
    pub pending_at_start: usize,
    /// Lookups submitted to the dispatcher.
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Subjects not looked up because the run was stopped.
    pub skipped: usize,
    pub stopped_on_auth: bool,
    pub stats: RetrievalStats,
}

impl RunReport {
    /// Whether every subject that was pending at the start got a result.
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.pending_at_start
    }
}
