//! Testing utilities and mock implementations.
//!
//! This module provides a mock results API so the orchestrator and
//! dispatcher can be exercised without a real remote service.
//!
//! # Example
//!
//! ```rust,ignore
//! use uinlookup_core::testing::{fixtures, MockResultsClient};
//!
//! let client = Arc::new(MockResultsClient::new());
//! let mut store = fixtures::uin_store(10);
//!
//! client.set_result(&fixtures::uins(&store)[0], "POSITIVE").await;
//! ```

mod mock_results_client;

pub use mock_results_client::{MockResultsClient, RecordedQuery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::client::{ResultsPayload, TestResult};
    use crate::subject::{IdType, Subject, SubjectStore};

    /// A payload with a single result entry.
    pub fn payload(result: &str) -> ResultsPayload {
        ResultsPayload {
            results: vec![TestResult {
                result: result.to_string(),
                swab_reason: Some("ROUTINE".to_string()),
                produced_at: Some("2021-06-01T10:00:00Z".to_string()),
            }],
        }
    }

    /// A UIN subject. The store never validates, so any string will do.
    pub fn uin_subject(uin: &str) -> Subject {
        Subject::new(IdType::Uin, uin, "SG", "")
    }

    /// A passport subject.
    pub fn passport_subject(nationality: &str, passport: &str) -> Subject {
        Subject::new(IdType::Passport, "", nationality, passport)
    }

    /// A store holding `n` distinct UIN subjects, in order.
    pub fn uin_store(n: usize) -> SubjectStore {
        let mut store = SubjectStore::new();
        for i in 0..n {
            store.insert(uin_subject(&format!("S{:07}A", i)));
        }
        store
    }

    /// The `uin` query value of every subject, in store order.
    pub fn uins(store: &SubjectStore) -> Vec<String> {
        store
            .iter()
            .map(|s| s.query(None).uin().to_string())
            .collect()
    }
}
