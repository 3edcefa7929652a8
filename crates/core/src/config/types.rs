use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Remote results API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base endpoint, e.g. "https://results.example.org/v2"
    pub base_url: String,
    /// Bearer token sent with every request
    pub api_key: String,
    /// Per-request timeout in seconds (default: 20)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    20
}

/// Retrieval run configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Maximum number of requests in flight at once.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    /// Emit a progress event whenever the remaining count is a multiple of this.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    /// Only consider results produced at or after this timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<String>,
    /// How many runs the CLI performs over subjects still lacking a result.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

fn default_concurrency_limit() -> usize {
    20
}

fn default_progress_interval() -> usize {
    100
}

fn default_max_rounds() -> u32 {
    1
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            progress_interval: default_progress_interval(),
            start_timestamp: None,
            max_rounds: default_max_rounds(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: SanitizedApiConfig,
    pub retrieval: RetrievalConfig,
    pub export: ExportConfig,
}

/// Sanitized API config (key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedApiConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: SanitizedApiConfig {
                base_url: config.api.base_url.clone(),
                api_key_configured: !config.api.api_key.is_empty(),
                timeout_secs: config.api.timeout_secs,
            },
            retrieval: config.retrieval.clone(),
            export: config.export.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let toml = r#"
[api]
base_url = "https://results.example.org/v2"
api_key = "abcdefgh1234"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.timeout_secs, 20);
        assert_eq!(config.retrieval.concurrency_limit, 20);
        assert_eq!(config.retrieval.progress_interval, 100);
        assert_eq!(config.retrieval.max_rounds, 1);
        assert!(config.retrieval.start_timestamp.is_none());
        assert_eq!(config.export.output_dir.to_str().unwrap(), ".");
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
[api]
base_url = "https://results.example.org/v2"
api_key = "abcdefgh1234"
timeout_secs = 30

[retrieval]
concurrency_limit = 4
progress_interval = 10
start_timestamp = "2021-06-01T00:00:00Z"
max_rounds = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.retrieval.concurrency_limit, 4);
        assert_eq!(config.retrieval.progress_interval, 10);
        assert_eq!(
            config.retrieval.start_timestamp.as_deref(),
            Some("2021-06-01T00:00:00Z")
        );
        assert_eq!(config.retrieval.max_rounds, 3);
    }

    #[test]
    fn test_deserialize_missing_api_key_fails() {
        let toml = r#"
[api]
base_url = "https://results.example.org/v2"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_key() {
        let config = Config {
            api: ApiConfig {
                base_url: "https://results.example.org/v2".to_string(),
                api_key: "super-secret-key".to_string(),
                timeout_secs: 20,
            },
            retrieval: RetrievalConfig::default(),
            export: ExportConfig::default(),
        };

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.api.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("super-secret-key"));
    }
}
