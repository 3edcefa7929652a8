//! Retrieval orchestrator.
//!
//! Drives the dispatcher across every subject still lacking a result:
//! - builds one [`ResultsQuery`](crate::client::ResultsQuery) per subject
//! - stores payloads as lookups settle, logs classified failures
//! - stops submitting on the first authentication failure
//! - recomputes aggregate counters once the run has drained

mod runner;
mod stats;
mod token;
mod types;

pub use runner::{RetrievalCallback, RetrievalOrchestrator};
pub use stats::RetrievalStats;
pub use token::StopToken;
pub use types::{OrchestratorError, RetrievalEvent, RunReport};
