//! Admission-controlled queue implementation.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use super::traits::RequestExecutor;
use super::types::{DispatchHandle, DispatcherStats};

type Outcome<E> = Result<<E as RequestExecutor>::Response, <E as RequestExecutor>::Error>;

/// A submitted request paired with the handle it must settle.
struct QueueEntry<E: RequestExecutor> {
    seq: u64,
    request: E::Request,
    completion: oneshot::Sender<Outcome<E>>,
}

/// Queue and in-flight bookkeeping. Only touched while holding the lock,
/// and the lock is never held across an await point.
struct DispatchState<E: RequestExecutor> {
    queue: VecDeque<QueueEntry<E>>,
    in_flight: HashSet<u64>,
    next_seq: u64,
    stats: DispatcherStats,
    /// Set once the runtime refuses to run new tasks; nothing is admitted
    /// afterwards.
    closed: bool,
}

impl<E: RequestExecutor> DispatchState<E> {
    /// Move entries from the queue head into the in-flight set while there
    /// is spare capacity.
    fn admit(&mut self, limit: usize) -> Vec<QueueEntry<E>> {
        let mut admitted = Vec::new();
        while self.in_flight.len() < limit {
            let Some(entry) = self.queue.pop_front() else {
                break;
            };
            self.in_flight.insert(entry.seq);
            self.stats.dispatched += 1;
            self.stats.peak_in_flight = self.stats.peak_in_flight.max(self.in_flight.len());
            admitted.push(entry);
        }
        admitted
    }

    /// Stop admitting and take every queued entry out. Dropping the
    /// returned entries settles their handles as aborted.
    fn close(&mut self) -> Vec<QueueEntry<E>> {
        self.closed = true;
        self.queue.drain(..).collect()
    }
}

struct Shared<E: RequestExecutor> {
    executor: Arc<E>,
    limit: usize,
    runtime: Handle,
    state: Mutex<DispatchState<E>>,
}

impl<E: RequestExecutor> Shared<E> {
    fn lock(&self) -> MutexGuard<'_, DispatchState<E>> {
        // Critical sections never panic, so a poisoned lock still holds
        // consistent state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Executes submitted requests with at most `limit` in flight.
///
/// Cheaply cloneable; clones share the same queue and capacity.
pub struct Dispatcher<E: RequestExecutor> {
    shared: Arc<Shared<E>>,
}

impl<E: RequestExecutor> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E: RequestExecutor> Dispatcher<E> {
    /// Create a dispatcher bound to the current tokio runtime.
    ///
    /// A limit of 0 is treated as 1.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(executor: Arc<E>, concurrency_limit: usize) -> Self {
        Self::with_runtime(executor, concurrency_limit, Handle::current())
    }

    /// Create a dispatcher that spawns executions on `runtime`.
    pub fn with_runtime(executor: Arc<E>, concurrency_limit: usize, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                executor,
                limit: concurrency_limit.max(1),
                runtime,
                state: Mutex::new(DispatchState {
                    queue: VecDeque::new(),
                    in_flight: HashSet::new(),
                    next_seq: 0,
                    stats: DispatcherStats::default(),
                    closed: false,
                }),
            }),
        }
    }

    /// Enqueue a request. Never blocks; the returned handle resolves when
    /// the execution settles.
    pub fn submit(&self, request: E::Request) -> DispatchHandle<E::Response, E::Error> {
        let (completion, rx) = oneshot::channel();

        let (seq, admitted) = {
            let mut state = self.shared.lock();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.stats.submitted += 1;
            if state.closed {
                // The completion sender drops here; the handle resolves as aborted.
                debug!(seq, "Dispatcher closed, request not queued");
                return DispatchHandle::new(seq, rx);
            }
            state.queue.push_back(QueueEntry {
                seq,
                request,
                completion,
            });
            (seq, state.admit(self.shared.limit))
        };

        trace!(seq, "Request submitted");
        launch(&self.shared, admitted);

        DispatchHandle::new(seq, rx)
    }

    /// Number of submitted requests still waiting for a slot.
    pub fn pending_count(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Number of requests currently executing.
    pub fn in_flight_count(&self) -> usize {
        self.shared.lock().in_flight.len()
    }

    /// Configured concurrency limit.
    pub fn concurrency_limit(&self) -> usize {
        self.shared.limit
    }

    /// Snapshot of the dispatcher counters.
    pub fn stats(&self) -> DispatcherStats {
        let state = self.shared.lock();
        DispatcherStats {
            queued: state.queue.len(),
            in_flight: state.in_flight.len(),
            ..state.stats
        }
    }
}

/// Spawn one execution task per admitted entry.
fn launch<E: RequestExecutor>(shared: &Arc<Shared<E>>, admitted: Vec<QueueEntry<E>>) {
    for entry in admitted {
        let mut slot = SlotRelease {
            shared: Arc::clone(shared),
            seq: entry.seq,
            started: false,
        };
        let executor = Arc::clone(&shared.executor);

        debug!(seq = entry.seq, "Dispatching request");
        shared.runtime.spawn(async move {
            slot.started = true;
            let outcome = executor.execute(entry.request).await;
            // Free the slot and admit the next entry before handing the
            // outcome back, so the submitter sees up-to-date counts.
            drop(slot);
            let _ = entry.completion.send(outcome);
        });
    }
}

/// Releases an in-flight slot when dropped.
///
/// Dropping happens on every exit path of an execution task (normal
/// completion, executor panic, task cancellation at runtime shutdown), so a
/// slot can never be removed without the next admission being attempted.
///
/// A task dropped before its first poll means the runtime is shutting down.
/// The dispatcher then closes instead of admitting more work, so the
/// remaining queue is aborted in one pass rather than by a chain of spawns
/// that are each dropped straight away.
struct SlotRelease<E: RequestExecutor> {
    shared: Arc<Shared<E>>,
    seq: u64,
    started: bool,
}

impl<E: RequestExecutor> Drop for SlotRelease<E> {
    fn drop(&mut self) {
        let (admitted, aborted) = {
            let mut state = self.shared.lock();
            if state.in_flight.remove(&self.seq) {
                state.stats.settled += 1;
            }
            if !self.started && !state.closed {
                debug!(seq = self.seq, "Runtime shutting down, closing dispatcher");
                let aborted = state.close();
                (Vec::new(), aborted)
            } else if state.closed {
                (Vec::new(), Vec::new())
            } else {
                (state.admit(self.shared.limit), Vec::new())
            }
        };

        trace!(seq = self.seq, "Request settled");
        drop(aborted);
        launch(&self.shared, admitted);
    }
}
