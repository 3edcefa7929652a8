use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::{ResultsPayload, ResultsQuery, TestResultCode};

/// Kind of identifier a subject is looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    /// National ID number (UIN).
    Uin,
    /// Passport number plus issuing country.
    Passport,
}

/// Deduplication key of a subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectKey(String);

impl SubjectKey {
    /// Build the key from identity fields.
    ///
    /// Passport subjects: `passport|<nationality>|<passport>`.
    /// UIN subjects: `id|<uin>|<nationality>|<passport>`.
    pub fn new(id_type: IdType, uin: &str, nationality: &str, passport: &str) -> Self {
        match id_type {
            IdType::Passport => Self(format!("passport|{}|{}", nationality, passport)),
            IdType::Uin => Self(format!("id|{}|{}|{}", uin, nationality, passport)),
        }
    }

    /// Wrap an already-formatted key.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unique identifier to look up, plus its result once retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id_type: IdType,
    /// Cleaned UIN (empty for passport subjects).
    pub uin: String,
    /// Two-letter nationality / country of issue.
    pub nationality: String,
    /// Cleaned passport number.
    pub passport: String,
    /// Extra columns carried through from import to export, in column order.
    #[serde(default)]
    pub extra: Vec<(String, String)>,
    /// Retrieved payload; `None` until a lookup succeeds.
    #[serde(default)]
    pub payload: Option<ResultsPayload>,
}

impl Subject {
    pub fn new(
        id_type: IdType,
        uin: impl Into<String>,
        nationality: impl Into<String>,
        passport: impl Into<String>,
    ) -> Self {
        Self {
            id_type,
            uin: uin.into(),
            nationality: nationality.into(),
            passport: passport.into(),
            extra: Vec::new(),
            payload: None,
        }
    }

    pub fn with_extra(mut self, extra: Vec<(String, String)>) -> Self {
        self.extra = extra;
        self
    }

    pub fn key(&self) -> SubjectKey {
        SubjectKey::new(self.id_type, &self.uin, &self.nationality, &self.passport)
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Classified result, `None` when not yet retrieved or unrecognised.
    pub fn result_code(&self) -> Option<TestResultCode> {
        self.payload.as_ref().and_then(ResultsPayload::code)
    }

    /// Build the lookup request for this subject.
    pub fn query(&self, start_timestamp: Option<&str>) -> ResultsQuery {
        let start_timestamp = start_timestamp.map(str::to_string);
        match self.id_type {
            IdType::Uin => ResultsQuery::new(self.key(), &self.uin, None, start_timestamp),
            IdType::Passport => ResultsQuery::new(
                self.key(),
                &self.passport,
                Some(self.nationality.clone()),
                start_timestamp,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let uin = Subject::new(IdType::Uin, "S1234567D", "SG", "");
        assert_eq!(uin.key().as_str(), "id|S1234567D|SG|");

        let passport = Subject::new(IdType::Passport, "", "MY", "A1234567");
        assert_eq!(passport.key().as_str(), "passport|MY|A1234567");
    }

    #[test]
    fn test_query_for_uin_subject() {
        let subject = Subject::new(IdType::Uin, "S1234567D", "SG", "E999");
        let query = subject.query(None);
        assert_eq!(query.uin(), "S1234567D");
        assert!(query.country_of_issue().is_none());
        assert_eq!(query.subject_key(), &subject.key());
    }

    #[test]
    fn test_query_for_passport_subject_uses_passport_and_country() {
        let subject = Subject::new(IdType::Passport, "", "MY", "A1234567");
        let query = subject.query(Some("2021-06-01"));
        assert_eq!(query.uin(), "A1234567");
        assert_eq!(query.country_of_issue(), Some("MY"));
        assert_eq!(query.start_timestamp(), Some("2021-06-01"));
    }

    #[test]
    fn test_result_code_absent_without_payload() {
        let subject = Subject::new(IdType::Uin, "S1234567D", "", "");
        assert!(!subject.has_payload());
        assert!(subject.result_code().is_none());
    }
}
