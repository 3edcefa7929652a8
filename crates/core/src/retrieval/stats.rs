use serde::{Deserialize, Serialize};

use crate::client::TestResultCode;
use crate::subject::SubjectStore;

/// Aggregate counters over a subject set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalStats {
    /// Subjects with a classified test result.
    pub retrieved: usize,
    pub positive_test_results: usize,
    pub negative_test_results: usize,
    pub pending_test_results: usize,
    pub invalid_test_results: usize,
    /// Subjects without a test result (empty payload or nothing retrieved yet).
    pub no_test_results: usize,
    pub with_test_results: usize,
    /// Subjects never successfully looked up.
    pub awaiting_retrieval: usize,
}

impl RetrievalStats {
    /// Recompute every counter from the full subject set.
    pub fn calculate(store: &SubjectStore) -> Self {
        let mut stats = Self::default();

        for subject in store.iter() {
            if !subject.has_payload() {
                stats.awaiting_retrieval += 1;
                stats.no_test_results += 1;
                continue;
            }

            match subject.result_code() {
                Some(TestResultCode::Positive) => stats.positive_test_results += 1,
                Some(TestResultCode::Negative) => stats.negative_test_results += 1,
                Some(TestResultCode::Pending) => stats.pending_test_results += 1,
                Some(TestResultCode::Invalid) => stats.invalid_test_results += 1,
                Some(TestResultCode::NoResult) => stats.no_test_results += 1,
                None => {}
            }
        }

        stats.with_test_results = stats.positive_test_results
            + stats.negative_test_results
            + stats.pending_test_results
            + stats.invalid_test_results;
        stats.retrieved = stats.with_test_results;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ResultsPayload, TestResult};
    use crate::subject::{IdType, Subject};

    fn subject(i: usize, result: Option<&str>) -> Subject {
        let mut s = Subject::new(IdType::Passport, "", "MY", format!("P{i}"));
        s.payload = result.map(|r| ResultsPayload {
            results: vec![TestResult {
                result: r.to_string(),
                swab_reason: None,
                produced_at: None,
            }],
        });
        s
    }

    #[test]
    fn test_calculate_mixed_results() {
        let mut store = SubjectStore::new();
        let results = [
            Some("POSITIVE"),
            Some("POSITIVE"),
            Some("NEGATIVE"),
            Some("PENDING"),
            Some("INVALID"),
            None,
            None,
        ];
        for (i, r) in results.iter().enumerate() {
            store.insert(subject(i, *r));
        }

        let stats = RetrievalStats::calculate(&store);
        assert_eq!(stats.positive_test_results, 2);
        assert_eq!(stats.negative_test_results, 1);
        assert_eq!(stats.pending_test_results, 1);
        assert_eq!(stats.invalid_test_results, 1);
        assert_eq!(stats.no_test_results, 2);
        assert_eq!(stats.with_test_results, 5);
        assert_eq!(stats.retrieved, 5);
        assert_eq!(stats.awaiting_retrieval, 2);
    }

    #[test]
    fn test_empty_payload_counts_as_no_result() {
        let mut store = SubjectStore::new();
        let mut s = subject(0, None);
        s.payload = Some(ResultsPayload::default());
        store.insert(s);

        let stats = RetrievalStats::calculate(&store);
        assert_eq!(stats.no_test_results, 1);
        assert_eq!(stats.awaiting_retrieval, 0);
        assert_eq!(stats.retrieved, 0);
    }

    #[test]
    fn test_recalculation_is_stable() {
        let mut store = SubjectStore::new();
        store.insert(subject(0, Some("NEGATIVE")));
        let first = RetrievalStats::calculate(&store);
        let second = RetrievalStats::calculate(&store);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_result_is_not_counted() {
        let mut store = SubjectStore::new();
        store.insert(subject(0, Some("INCONCLUSIVE")));
        let stats = RetrievalStats::calculate(&store);
        assert_eq!(stats.with_test_results, 0);
        assert_eq!(stats.no_test_results, 0);
    }
}
