//! Remote results API client.
//!
//! This module provides the request descriptor ([`ResultsQuery`]), the
//! response payload types and the reqwest-backed [`HttpResultsClient`],
//! which plugs into the dispatcher as a [`RequestExecutor`](crate::dispatcher::RequestExecutor).

mod error;
mod http;
mod types;

pub use error::{ClientError, RetrievalError, AUTH_FAILED_MESSAGE};
pub use http::HttpResultsClient;
pub use types::*;
