//! Retrieval run integration tests.
//!
//! These drive the orchestrator end to end against the mock results client:
//! pending subjects -> dispatcher -> payloads stored -> counters recomputed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use uinlookup_core::{
    testing::{fixtures, MockResultsClient},
    RetrievalConfig, RetrievalError, RetrievalEvent, RetrievalOrchestrator, RetrievalStats,
    RunReport, SessionLog, SubjectStore,
};

fn config(limit: usize) -> RetrievalConfig {
    RetrievalConfig {
        concurrency_limit: limit,
        ..Default::default()
    }
}

/// Run once and collect every emitted event.
async fn run_collecting(
    client: Arc<MockResultsClient>,
    cfg: RetrievalConfig,
    store: &mut SubjectStore,
    log: &mut SessionLog,
) -> (RunReport, Vec<RetrievalEvent>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let orchestrator = RetrievalOrchestrator::new(cfg, client).with_callback(Arc::new(
        move |event: &RetrievalEvent| sink.lock().unwrap().push(event.clone()),
    ));

    let report = orchestrator.run(store, log).await.expect("run failed");
    let events = events.lock().unwrap().clone();
    (report, events)
}

fn progress_count(events: &[RetrievalEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, RetrievalEvent::Progress { .. }))
        .count()
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let client = Arc::new(MockResultsClient::new());
    let mut store = fixtures::uin_store(12);
    let mut log = SessionLog::new();
    let uins = fixtures::uins(&store);
    client.set_result(&uins[0], "POSITIVE").await;
    client.set_result(&uins[1], "PENDING").await;

    let (first, _) = run_collecting(Arc::clone(&client), config(4), &mut store, &mut log).await;
    assert_eq!(first.submitted, 12);
    assert!(first.is_complete());

    let (second, events) =
        run_collecting(Arc::clone(&client), config(4), &mut store, &mut log).await;
    assert_eq!(second.pending_at_start, 0);
    assert_eq!(second.submitted, 0);
    assert_eq!(second.stats, first.stats);
    assert_eq!(client.call_count().await, 12);
    assert!(matches!(events.last(), Some(RetrievalEvent::Completed(_))));
}

#[tokio::test]
async fn test_auth_failure_stops_further_submissions() {
    let client = Arc::new(MockResultsClient::new());
    let mut store = fixtures::uin_store(10);
    let mut log = SessionLog::new();
    let uins = fixtures::uins(&store);
    client.fail(&uins[2], RetrievalError::Authentication).await;

    let (report, _) = run_collecting(Arc::clone(&client), config(1), &mut store, &mut log).await;

    assert!(report.stopped_on_auth);
    assert_eq!(report.submitted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 7);
    assert!(!report.is_complete());

    assert_eq!(client.called_uins().await, uins[..3].to_vec());

    // Subjects 3..10 are untouched.
    let pending = store.pending_keys();
    assert_eq!(pending.len(), 8);
    for subject in store.iter().skip(3) {
        assert!(!subject.has_payload());
    }

    let auth_entries = log
        .messages()
        .filter(|m| *m == "ERROR: Authentication failure encountered, stopping early")
        .count();
    assert_eq!(auth_entries, 1);
}

#[tokio::test]
async fn test_auth_failure_under_concurrency_drains_in_flight() {
    let client = Arc::new(MockResultsClient::new());
    client.set_delay(Duration::from_millis(5)).await;
    let mut store = fixtures::uin_store(40);
    let mut log = SessionLog::new();
    let uins = fixtures::uins(&store);
    client.fail(&uins[0], RetrievalError::Authentication).await;

    let (report, _) = run_collecting(Arc::clone(&client), config(4), &mut store, &mut log).await;

    assert!(report.stopped_on_auth);
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded + report.failed + report.skipped, 40);
    assert!(report.skipped > 0);

    // Queued lookups admitted after the stop never reach the remote.
    let calls = client.call_count().await;
    assert!(calls < 40);
    assert_eq!(report.succeeded + report.failed, calls);
    assert_eq!(store.pending_keys().len(), 40 - report.succeeded);
}

#[tokio::test]
async fn test_progress_boundaries() {
    for (size, expected) in [(99, 0), (100, 1)] {
        let client = Arc::new(MockResultsClient::new());
        let mut store = fixtures::uin_store(size);
        let mut log = SessionLog::new();

        let (_, events) = run_collecting(client, config(20), &mut store, &mut log).await;
        assert_eq!(progress_count(&events), expected, "batch of {size}");
    }
}

#[tokio::test]
async fn test_progress_interval_is_configurable() {
    let client = Arc::new(MockResultsClient::new());
    let mut store = fixtures::uin_store(10);
    let mut log = SessionLog::new();
    let cfg = RetrievalConfig {
        progress_interval: 5,
        ..config(1)
    };

    let (_, events) = run_collecting(client, cfg, &mut store, &mut log).await;
    let remaining: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            RetrievalEvent::Progress { remaining, .. } => Some(*remaining),
            _ => None,
        })
        .collect();
    assert!(remaining.contains(&10));
    assert!(remaining.iter().all(|r| r % 5 == 0 && *r > 0));
}

#[tokio::test]
async fn test_limit_one_is_sequential() {
    let client = Arc::new(MockResultsClient::new());
    client.set_delay(Duration::from_millis(5)).await;
    let mut store = fixtures::uin_store(6);
    let mut log = SessionLog::new();

    run_collecting(Arc::clone(&client), config(1), &mut store, &mut log).await;

    let calls = client.calls().await;
    assert_eq!(calls.len(), 6);
    for pair in calls.windows(2) {
        assert!(pair[1].started_at >= pair[0].finished_at);
    }
    assert_eq!(client.peak_concurrency(), 1);
    assert_eq!(client.called_uins().await, fixtures::uins(&store));
}

#[tokio::test]
async fn test_limit_is_never_exceeded() {
    let client = Arc::new(MockResultsClient::new());
    client.set_delay(Duration::from_millis(2)).await;
    let mut store = fixtures::uin_store(60);
    let mut log = SessionLog::new();

    let (report, _) = run_collecting(Arc::clone(&client), config(5), &mut store, &mut log).await;

    assert_eq!(report.succeeded, 60);
    assert!(client.peak_concurrency() <= 5);
    assert!(store.pending_keys().is_empty());
}

#[tokio::test]
async fn test_failed_subjects_are_retried_next_round() {
    let client = Arc::new(MockResultsClient::new());
    let mut store = fixtures::uin_store(5);
    let mut log = SessionLog::new();
    let uins = fixtures::uins(&store);
    client
        .fail(&uins[3], RetrievalError::NoResponse("timed out".into()))
        .await;

    let (first, _) = run_collecting(Arc::clone(&client), config(2), &mut store, &mut log).await;
    assert_eq!(first.failed, 1);
    assert_eq!(first.stats.awaiting_retrieval, 1);

    client.clear(&uins[3]).await;
    let (second, _) = run_collecting(Arc::clone(&client), config(2), &mut store, &mut log).await;
    assert_eq!(second.submitted, 1);
    assert_eq!(second.stats.awaiting_retrieval, 0);
    assert_eq!(second.stats.negative_test_results, 5);
}

#[tokio::test]
async fn test_aggregation_over_mixed_results() {
    let client = Arc::new(MockResultsClient::new());
    let mut store = fixtures::uin_store(7);
    let mut log = SessionLog::new();
    let uins = fixtures::uins(&store);
    for (uin, result) in uins
        .iter()
        .zip(["POSITIVE", "POSITIVE", "NEGATIVE", "PENDING", "INVALID"])
    {
        client.set_result(uin, result).await;
    }
    client
        .set_payload(&uins[5], uinlookup_core::ResultsPayload::default())
        .await;
    client
        .fail(&uins[6], RetrievalError::Local("bad body".into()))
        .await;

    let (report, _) = run_collecting(client, config(3), &mut store, &mut log).await;

    assert_eq!(
        report.stats,
        RetrievalStats {
            retrieved: 5,
            positive_test_results: 2,
            negative_test_results: 1,
            pending_test_results: 1,
            invalid_test_results: 1,
            no_test_results: 2,
            with_test_results: 5,
            awaiting_retrieval: 1,
        }
    );
}

#[tokio::test]
async fn test_passport_subject_is_looked_up_with_country_of_issue() {
    let client = Arc::new(MockResultsClient::new());
    let mut store = SubjectStore::new();
    let mut log = SessionLog::new();
    let passport = fixtures::passport_subject("MY", "A1234567");
    let passport_key = passport.key();
    store.insert(fixtures::uin_subject("S1234567D"));
    store.insert(passport);
    client.set_result("A1234567", "POSITIVE").await;

    let (report, _) = run_collecting(Arc::clone(&client), config(2), &mut store, &mut log).await;
    assert!(report.is_complete());
    assert_eq!(report.stats.positive_test_results, 1);

    let calls = client.calls().await;
    assert_eq!(calls.len(), 2);
    let by_passport = calls.iter().find(|c| c.uin == "A1234567").unwrap();
    assert_eq!(by_passport.country_of_issue.as_deref(), Some("MY"));
    let by_uin = calls.iter().find(|c| c.uin == "S1234567D").unwrap();
    assert!(by_uin.country_of_issue.is_none());

    assert!(store.get(&passport_key).unwrap().has_payload());
}
