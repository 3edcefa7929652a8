//! reqwest-backed client for the results endpoint.
//!
//! Redirects are never followed: a 3xx answer means the base URL is wrong
//! and is surfaced as a remote response error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{redirect, Client};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::dispatcher::RequestExecutor;

use super::error::{ClientError, RetrievalError, AUTH_FAILED_MESSAGE};
use super::types::{ResultsPayload, ResultsQuery};

/// Error body shape of the results API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Results API client.
pub struct HttpResultsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpResultsClient {
    /// Create a new client from the API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        if config.api_key.is_empty() {
            return Err(ClientError::NotConfigured(
                "API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up the results for one subject.
    pub async fn fetch(&self, query: &ResultsQuery) -> Result<ResultsPayload, RetrievalError> {
        let url = format!("{}{}", self.base_url, query.to_path());

        debug!(subject = %query.subject_key(), "Fetching results");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = render_headers(response.headers());
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(status = status.as_u16(), error = %e, "Failed to read error body");
                    format!("<body unavailable: {}>", e)
                }
            };

            if is_auth_failure(&body) {
                return Err(RetrievalError::Authentication);
            }

            return Err(RetrievalError::RemoteResponse {
                status: status.as_u16(),
                headers,
                body,
            });
        }

        response.json::<ResultsPayload>().await.map_err(|e| {
            RetrievalError::Local(format!("Failed to parse results response: {}", e))
        })
    }
}

#[async_trait]
impl RequestExecutor for HttpResultsClient {
    type Request = ResultsQuery;
    type Response = ResultsPayload;
    type Error = RetrievalError;

    async fn execute(&self, query: ResultsQuery) -> Result<ResultsPayload, RetrievalError> {
        self.fetch(&query).await
    }
}

fn is_auth_failure(body: &str) -> bool {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .is_some_and(|m| m == AUTH_FAILED_MESSAGE)
}

fn render_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value.to_str().unwrap_or("<binary>")))
        .collect::<Vec<_>>()
        .join("\n")
}
