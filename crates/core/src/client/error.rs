use thiserror::Error;

/// Message the results API returns when the bearer token is rejected.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed.";

/// Errors raised while constructing a client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Setup(#[from] reqwest::Error),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Outcome classification for a single failed lookup.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    /// The remote service rejected the credentials. Fatal to the run.
    #[error("authentication failed")]
    Authentication,

    /// The remote service answered with a non-success status.
    #[error("unexpected response: HTTP {status}")]
    RemoteResponse {
        status: u16,
        headers: String,
        body: String,
    },

    /// No response was received (connect failure, timeout).
    #[error("no response: {0}")]
    NoResponse(String),

    /// Local or otherwise unexpected failure.
    #[error("unexpected error from client: {0}")]
    Local(String),

    /// The run was stopped before this request was sent.
    #[error("request cancelled before it was sent")]
    Cancelled,
}

impl RetrievalError {
    /// Whether this error must stop further submissions in the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RetrievalError::Authentication)
    }

    /// Whether the remote answered with a redirect that was not followed.
    pub fn is_redirect(&self) -> bool {
        matches!(self, RetrievalError::RemoteResponse { status, .. } if (300..400).contains(status))
    }
}

impl From<reqwest::Error> for RetrievalError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            RetrievalError::NoResponse(e.to_string())
        } else {
            RetrievalError::Local(e.to_string())
        }
    }
}
