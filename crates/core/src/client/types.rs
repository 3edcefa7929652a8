use serde::{Deserialize, Serialize};

use crate::subject::SubjectKey;

/// One outbound lookup, built from a subject's identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsQuery {
    subject_key: SubjectKey,
    uin: String,
    country_of_issue: Option<String>,
    start_timestamp: Option<String>,
}

impl ResultsQuery {
    pub fn new(
        subject_key: SubjectKey,
        uin: impl Into<String>,
        country_of_issue: Option<String>,
        start_timestamp: Option<String>,
    ) -> Self {
        Self {
            subject_key,
            uin: uin.into(),
            country_of_issue,
            start_timestamp: start_timestamp.filter(|ts| !ts.trim().is_empty()),
        }
    }

    pub fn subject_key(&self) -> &SubjectKey {
        &self.subject_key
    }

    pub fn uin(&self) -> &str {
        &self.uin
    }

    pub fn country_of_issue(&self) -> Option<&str> {
        self.country_of_issue.as_deref()
    }

    pub fn start_timestamp(&self) -> Option<&str> {
        self.start_timestamp.as_deref()
    }

    /// Path and query string relative to the API base URL.
    pub fn to_path(&self) -> String {
        let mut path = format!("/results/patient?uin={}", urlencoding::encode(&self.uin));

        if let Some(country) = &self.country_of_issue {
            path.push_str(&format!(
                "&uin_country_of_issue={}",
                urlencoding::encode(country)
            ));
        }

        if let Some(ts) = &self.start_timestamp {
            path.push_str(&format!("&start_timestamp={}", urlencoding::encode(ts.trim())));
        }

        path
    }
}

/// Successful response body of the results endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsPayload {
    #[serde(default)]
    pub results: Vec<TestResult>,
}

impl ResultsPayload {
    /// Only the first entry is meaningful; the API orders them newest first.
    pub fn latest(&self) -> Option<&TestResult> {
        self.results.first()
    }

    /// Classification used for aggregation and export.
    pub fn code(&self) -> Option<TestResultCode> {
        match self.latest() {
            None => Some(TestResultCode::NoResult),
            Some(result) => TestResultCode::parse(&result.result),
        }
    }
}

/// A single test result entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub result: String,
    #[serde(default)]
    pub swab_reason: Option<String>,
    #[serde(default)]
    pub produced_at: Option<String>,
}

/// Known result classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestResultCode {
    Positive,
    Negative,
    Pending,
    Invalid,
    #[serde(rename = "NO RESULT")]
    NoResult,
}

impl TestResultCode {
    /// Parse a result string as returned by the API. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "POSITIVE" => Some(Self::Positive),
            "NEGATIVE" => Some(Self::Negative),
            "PENDING" => Some(Self::Pending),
            "INVALID" => Some(Self::Invalid),
            "NO RESULT" => Some(Self::NoResult),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Pending => "PENDING",
            Self::Invalid => "INVALID",
            Self::NoResult => "NO RESULT",
        }
    }
}

impl std::fmt::Display for TestResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
