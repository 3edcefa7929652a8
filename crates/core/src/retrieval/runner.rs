//! Retrieval orchestrator implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::client::{ResultsPayload, ResultsQuery, RetrievalError};
use crate::config::RetrievalConfig;
use crate::dispatcher::{DispatchError, Dispatcher, RequestExecutor};
use crate::session_log::SessionLog;
use crate::subject::{SubjectKey, SubjectStore};

use super::stats::RetrievalStats;
use super::token::StopToken;
use super::types::{OrchestratorError, RetrievalEvent, RunReport};

/// Callback receiving progress and completion events.
pub type RetrievalCallback = Arc<dyn Fn(&RetrievalEvent) + Send + Sync>;

type LookupOutcome = Result<ResultsPayload, DispatchError<RetrievalError>>;

/// Wraps the results client so requests admitted after the run was stopped
/// are never sent.
struct StopAwareExecutor<C> {
    inner: Arc<C>,
    token: StopToken,
}

#[async_trait]
impl<C> RequestExecutor for StopAwareExecutor<C>
where
    C: RequestExecutor<Request = ResultsQuery, Response = ResultsPayload, Error = RetrievalError>,
{
    type Request = ResultsQuery;
    type Response = ResultsPayload;
    type Error = RetrievalError;

    async fn execute(&self, query: ResultsQuery) -> Result<ResultsPayload, RetrievalError> {
        if self.token.is_stopped() {
            return Err(RetrievalError::Cancelled);
        }
        self.inner.execute(query).await
    }
}

/// Clears the running flag when a run ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Looks up every subject still lacking a result.
pub struct RetrievalOrchestrator<C> {
    config: RetrievalConfig,
    client: Arc<C>,
    callback: Option<RetrievalCallback>,
    running: AtomicBool,
}

impl<C> RetrievalOrchestrator<C>
where
    C: RequestExecutor<Request = ResultsQuery, Response = ResultsPayload, Error = RetrievalError>,
{
    /// Create a new orchestrator.
    pub fn new(config: RetrievalConfig, client: Arc<C>) -> Self {
        Self {
            config,
            client,
            callback: None,
            running: AtomicBool::new(false),
        }
    }

    /// Set the callback for progress and completion events.
    pub fn with_callback(mut self, callback: RetrievalCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run one retrieval pass over `store`.
    ///
    /// Resolves once every submitted lookup has settled. Individual failures
    /// never fail the run; they are written to `log` and the subject is left
    /// without a result so a later run can pick it up again.
    pub async fn run(
        &self,
        store: &mut SubjectStore,
        log: &mut SessionLog,
    ) -> Result<RunReport, OrchestratorError> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Retrieval run requested while another is in progress");
            return Err(OrchestratorError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        Ok(self.run_pass(store, log).await)
    }

    async fn run_pass(&self, store: &mut SubjectStore, log: &mut SessionLog) -> RunReport {
        let run_id = Uuid::new_v4();
        let token = StopToken::new();
        let executor = Arc::new(StopAwareExecutor {
            inner: Arc::clone(&self.client),
            token: token.clone(),
        });
        let dispatcher = Dispatcher::new(executor, self.config.concurrency_limit);

        let pending = store.pending_keys();
        let total = pending.len();

        info!(
            %run_id,
            pending = total,
            concurrency = dispatcher.concurrency_limit(),
            "Starting retrieval run"
        );

        let mut report = RunReport {
            run_id,
            pending_at_start: total,
            submitted: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            stopped_on_auth: false,
            stats: RetrievalStats::default(),
        };

        let mut outstanding = FuturesUnordered::new();
        let mut settled = 0usize;
        let mut last_progress = None;

        for key in pending {
            // Let finished lookups land first so the stop check below sees
            // every settlement so far.
            tokio::task::yield_now().await;
            while let Some(Some((key, outcome))) = outstanding.next().now_or_never() {
                settled += 1;
                self.apply(store, log, &token, &mut report, key, outcome);
            }

            if token.is_stopped() {
                report.skipped += 1;
                continue;
            }

            let Some(subject) = store.get(&key) else {
                continue;
            };
            let query = subject.query(self.config.start_timestamp.as_deref());
            let handle = dispatcher.submit(query);
            outstanding.push(async move { (key, handle.await) });
            report.submitted += 1;

            let remaining = total - settled;
            if last_progress != Some(remaining)
                && self.report_progress(remaining, dispatcher.pending_count())
            {
                last_progress = Some(remaining);
            }
        }

        while let Some((key, outcome)) = outstanding.next().await {
            self.apply(store, log, &token, &mut report, key, outcome);
        }

        report.stats = RetrievalStats::calculate(store);

        info!(
            %run_id,
            submitted = report.submitted,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            stopped_on_auth = report.stopped_on_auth,
            "Retrieval run finished"
        );

        self.emit(&RetrievalEvent::Completed(report.stats));
        report
    }

    /// Record one settled lookup.
    fn apply(
        &self,
        store: &mut SubjectStore,
        log: &mut SessionLog,
        token: &StopToken,
        report: &mut RunReport,
        key: SubjectKey,
        outcome: LookupOutcome,
    ) {
        match outcome {
            Ok(payload) => {
                if store.set_payload(&key, payload) {
                    report.succeeded += 1;
                } else {
                    warn!(subject = %key, "Result arrived for a subject that already has one");
                }
            }
            Err(DispatchError::Execution(RetrievalError::Cancelled)) => {
                debug!(subject = %key, "Lookup cancelled after stop");
                report.skipped += 1;
            }
            Err(DispatchError::Execution(err)) => {
                report.failed += 1;
                self.record_failure(log, token, report, err);
            }
            Err(DispatchError::Aborted) => {
                report.failed += 1;
                error!(subject = %key, "Lookup aborted without an outcome");
                log.push("ERROR: Unexpected error from client: lookup aborted");
            }
        }
    }

    fn record_failure(
        &self,
        log: &mut SessionLog,
        token: &StopToken,
        report: &mut RunReport,
        err: RetrievalError,
    ) {
        if err.is_fatal() {
            if token.stop() {
                report.stopped_on_auth = true;
                error!("Authentication failure, stopping further submissions");
                log.push("ERROR: Authentication failure encountered, stopping early");
            }
            return;
        }

        let redirect = err.is_redirect();
        match err {
            RetrievalError::RemoteResponse {
                status,
                headers,
                body,
            } => {
                if redirect {
                    warn!(status, "Redirect response not followed");
                    log.push(format!(
                        "ERROR: Redirect response (HTTP {}) was not followed, check the API base URL",
                        status
                    ));
                } else {
                    warn!(status, "Unexpected response from results API");
                    log.push(format!("ERROR: Some unexpected response code (HTTP {})", status));
                }
                log.push(headers);
                log.push(body);
            }
            RetrievalError::NoResponse(reason) => {
                warn!(%reason, "No response from results API");
                log.push(format!("ERROR: No response {}", reason));
            }
            RetrievalError::Local(reason) => {
                warn!(%reason, "Local error during lookup");
                log.push(format!("ERROR: Unexpected error from client {}", reason));
            }
            RetrievalError::Authentication | RetrievalError::Cancelled => {}
        }
    }

    /// Emit a progress event when `remaining` sits on an interval boundary.
    fn report_progress(&self, remaining: usize, queued: usize) -> bool {
        let interval = self.config.progress_interval.max(1);
        if remaining == 0 || remaining % interval != 0 {
            return false;
        }
        debug!(remaining, queued, "Retrieval progress");
        self.emit(&RetrievalEvent::Progress { remaining, queued });
        true
    }

    fn emit(&self, event: &RetrievalEvent) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }
}
