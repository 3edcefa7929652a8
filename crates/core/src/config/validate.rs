use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{types::Config, ConfigError};

static BASE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[A-Za-z.\-:0-9]*/v2$").expect("valid base url regex"));

static API_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-_/=+]{8,}$").expect("valid api key regex"));

/// Validate configuration
/// Currently validates:
/// - API base URL shape (scheme, host, `/v2` suffix)
/// - API key character set and minimum length
/// - Retrieval limits are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !BASE_URL_RE.is_match(&config.api.base_url) {
        return Err(ConfigError::ValidationError(
            "API Base URL is invalid format".to_string(),
        ));
    }

    if !API_KEY_RE.is_match(&config.api.api_key) {
        return Err(ConfigError::ValidationError(
            "API Key is invalid format".to_string(),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.retrieval.concurrency_limit == 0 {
        return Err(ConfigError::ValidationError(
            "retrieval.concurrency_limit cannot be 0".to_string(),
        ));
    }

    if config.retrieval.progress_interval == 0 {
        return Err(ConfigError::ValidationError(
            "retrieval.progress_interval cannot be 0".to_string(),
        ));
    }

    if config.retrieval.max_rounds == 0 {
        return Err(ConfigError::ValidationError(
            "retrieval.max_rounds cannot be 0".to_string(),
        ));
    }

    Ok(())
}
