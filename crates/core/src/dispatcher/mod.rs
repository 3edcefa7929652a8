//! Bounded concurrency request dispatcher.
//!
//! The dispatcher accepts an unbounded stream of requests and executes them
//! through a [`RequestExecutor`] while never letting more than
//! `concurrency_limit` executions overlap. Requests are admitted strictly in
//! submission order. Admission is attempted on two triggers only: a new
//! submission, and the settlement of an in-flight execution (success, error
//! or panic alike).

mod queue;
mod traits;
mod types;

pub use queue::Dispatcher;
pub use traits::RequestExecutor;
pub use types::{DispatchError, DispatchHandle, DispatcherStats};
