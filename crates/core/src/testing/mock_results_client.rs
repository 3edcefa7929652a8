//! Mock results client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::client::{ResultsPayload, ResultsQuery, RetrievalError};
use crate::dispatcher::RequestExecutor;

use super::fixtures;

/// A recorded lookup for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    /// The `uin` query parameter.
    pub uin: String,
    pub country_of_issue: Option<String>,
    pub start_timestamp: Option<String>,
    /// When the execution started.
    pub started_at: Instant,
    /// When the execution finished.
    pub finished_at: Instant,
}

/// Mock implementation of the results API.
///
/// Provides controllable behavior for testing:
/// - Scripted payloads or errors per UIN (default: one NEGATIVE result)
/// - A fixed per-call delay
/// - Recorded calls with start/finish timestamps
/// - Current and peak concurrency
///
/// # Example
///
/// ```rust,ignore
/// use uinlookup_core::testing::MockResultsClient;
///
/// let client = MockResultsClient::new();
/// client.set_result("S1234567D", "POSITIVE").await;
/// client.fail("T7654321A", RetrievalError::Authentication).await;
/// client.set_delay(Duration::from_millis(10)).await;
/// ```
#[derive(Debug)]
pub struct MockResultsClient {
    /// Scripted replies by UIN.
    replies: Arc<RwLock<HashMap<String, Result<ResultsPayload, RetrievalError>>>>,
    /// Delay applied to every call.
    delay: Arc<RwLock<Duration>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedQuery>>>,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for MockResultsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResultsClient {
    /// Create a new mock with no scripted replies and no delay.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            calls: Arc::new(RwLock::new(Vec::new())),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Reply to `uin` with a single result of the given code.
    pub async fn set_result(&self, uin: &str, result: &str) {
        self.set_payload(uin, fixtures::payload(result)).await;
    }

    /// Reply to `uin` with the given payload.
    pub async fn set_payload(&self, uin: &str, payload: ResultsPayload) {
        self.replies
            .write()
            .await
            .insert(uin.to_string(), Ok(payload));
    }

    /// Fail every lookup of `uin` with `error`.
    pub async fn fail(&self, uin: &str, error: RetrievalError) {
        self.replies
            .write()
            .await
            .insert(uin.to_string(), Err(error));
    }

    /// Remove the scripted reply for `uin`.
    pub async fn clear(&self, uin: &str) {
        self.replies.write().await.remove(uin);
    }

    /// Set the delay applied to every call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all recorded calls, in completion order.
    pub async fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.read().await.clone()
    }

    /// UINs that were looked up.
    pub async fn called_uins(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .map(|c| c.uin.clone())
            .collect()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Highest number of calls observed executing at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestExecutor for MockResultsClient {
    type Request = ResultsQuery;
    type Response = ResultsPayload;
    type Error = RetrievalError;

    async fn execute(&self, query: ResultsQuery) -> Result<ResultsPayload, RetrievalError> {
        let started_at = Instant::now();
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .replies
            .read()
            .await
            .get(query.uin())
            .cloned()
            .unwrap_or_else(|| Ok(fixtures::payload("NEGATIVE")));

        self.current.fetch_sub(1, Ordering::SeqCst);
        self.calls.write().await.push(RecordedQuery {
            uin: query.uin().to_string(),
            country_of_issue: query.country_of_issue().map(str::to_string),
            start_timestamp: query.start_timestamp().map(str::to_string),
            started_at,
            finished_at: Instant::now(),
        });

        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TestResultCode;
    use crate::subject::SubjectKey;

    fn query(uin: &str) -> ResultsQuery {
        ResultsQuery::new(SubjectKey::from_raw(uin), uin, None, None)
    }

    #[tokio::test]
    async fn test_default_reply_is_negative() {
        let client = MockResultsClient::new();
        let payload = client.execute(query("S1")).await.unwrap();
        assert_eq!(payload.code(), Some(TestResultCode::Negative));
        assert_eq!(client.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_scripted_replies() {
        let client = MockResultsClient::new();
        client.set_result("S1", "POSITIVE").await;
        client.fail("S2", RetrievalError::Authentication).await;

        let ok = client.execute(query("S1")).await.unwrap();
        assert_eq!(ok.code(), Some(TestResultCode::Positive));

        let err = client.execute(query("S2")).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Authentication));

        client.clear("S2").await;
        assert!(client.execute(query("S2")).await.is_ok());
        assert_eq!(client.called_uins().await, vec!["S1", "S2", "S2"]);
    }
}
