use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::oneshot;

/// Failure of a dispatched request as seen by the submitter.
#[derive(Debug, Error)]
pub enum DispatchError<E> {
    /// The executor returned an error.
    #[error("{0}")]
    Execution(E),

    /// The execution ended without producing an outcome (executor panicked
    /// or the runtime shut down).
    #[error("execution aborted before settling")]
    Aborted,
}

/// Completion handle returned by [`Dispatcher::submit`](super::Dispatcher::submit).
///
/// Resolves exactly once, when the underlying execution settles.
#[derive(Debug)]
pub struct DispatchHandle<T, E> {
    seq: u64,
    rx: oneshot::Receiver<Result<T, E>>,
}

impl<T, E> DispatchHandle<T, E> {
    pub(super) fn new(seq: u64, rx: oneshot::Receiver<Result<T, E>>) -> Self {
        Self { seq, rx }
    }

    /// Submission sequence number (0-based, dense).
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl<T, E> Future for DispatchHandle<T, E> {
    type Output = Result<T, DispatchError<E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx).poll(cx).map(|received| match received {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DispatchError::Execution(e)),
            Err(_) => Err(DispatchError::Aborted),
        })
    }
}

/// Counters describing a dispatcher's lifetime so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatcherStats {
    pub submitted: u64,
    pub dispatched: u64,
    pub settled: u64,
    pub queued: usize,
    pub in_flight: usize,
    pub peak_in_flight: usize,
}
