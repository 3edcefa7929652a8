use std::collections::HashMap;

use crate::client::ResultsPayload;

use super::types::{Subject, SubjectKey};

/// Insertion-ordered collection of unique subjects.
///
/// Iteration always follows insertion order so exports are deterministic.
#[derive(Debug, Clone, Default)]
pub struct SubjectStore {
    subjects: Vec<Subject>,
    index: HashMap<SubjectKey, usize>,
    extra_headers: Vec<String>,
}

impl SubjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a subject. Returns `false` (and keeps the existing entry) when
    /// a subject with the same key is already present.
    pub fn insert(&mut self, subject: Subject) -> bool {
        let key = subject.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.subjects.len());
        self.subjects.push(subject);
        true
    }

    pub fn contains(&self, key: &SubjectKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &SubjectKey) -> Option<&Subject> {
        self.index.get(key).map(|&i| &self.subjects[i])
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter()
    }

    /// Keys of subjects that have no payload yet, in insertion order.
    pub fn pending_keys(&self) -> Vec<SubjectKey> {
        self.subjects
            .iter()
            .filter(|s| !s.has_payload())
            .map(Subject::key)
            .collect()
    }

    /// Store the retrieved payload on a subject.
    ///
    /// Returns `false` if the key is unknown or the subject already has a
    /// payload; a payload is never overwritten.
    pub fn set_payload(&mut self, key: &SubjectKey, payload: ResultsPayload) -> bool {
        let Some(&i) = self.index.get(key) else {
            return false;
        };
        let subject = &mut self.subjects[i];
        if subject.payload.is_some() {
            return false;
        }
        subject.payload = Some(payload);
        true
    }

    /// Headers of the extra (pass-through) columns of the last imported file.
    pub fn extra_headers(&self) -> &[String] {
        &self.extra_headers
    }

    pub fn set_extra_headers(&mut self, headers: Vec<String>) {
        self.extra_headers = headers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::IdType;

    fn uin(id: &str) -> Subject {
        Subject::new(IdType::Uin, id, "SG", "")
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut store = SubjectStore::new();
        assert!(store.insert(uin("S1234567D")));
        assert!(!store.insert(uin("S1234567D")));
        assert!(store.insert(Subject::new(IdType::Uin, "S1234567D", "MY", "")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut store = SubjectStore::new();
        for id in ["T0000003C", "S0000001I", "F0000002X"] {
            store.insert(uin(id));
        }
        let order: Vec<_> = store.iter().map(|s| s.uin.as_str()).collect();
        assert_eq!(order, vec!["T0000003C", "S0000001I", "F0000002X"]);
    }

    #[test]
    fn test_set_payload_once() {
        let mut store = SubjectStore::new();
        let subject = uin("S1234567D");
        let key = subject.key();
        store.insert(subject);

        assert_eq!(store.pending_keys(), vec![key.clone()]);
        assert!(store.set_payload(&key, ResultsPayload::default()));
        assert!(!store.set_payload(&key, ResultsPayload::default()));
        assert!(store.pending_keys().is_empty());
        assert!(store.get(&key).unwrap().has_payload());
    }

    #[test]
    fn test_set_payload_unknown_key() {
        let mut store = SubjectStore::new();
        assert!(!store.set_payload(&SubjectKey::from_raw("id|X||"), ResultsPayload::default()));
    }
}
