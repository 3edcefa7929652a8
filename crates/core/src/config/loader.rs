use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Prefix for environment variable overrides, e.g. `UINLOOKUP_API__API_KEY`.
pub const ENV_PREFIX: &str = "UINLOOKUP_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub start_timestamp: Option<String>,
    pub concurrency_limit: Option<usize>,
    pub max_rounds: Option<u32>,
    pub output_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    fn apply(&self, mut figment: Figment) -> Figment {
        if let Some(v) = &self.base_url {
            figment = figment.merge(Serialized::default("api.base_url", v));
        }
        if let Some(v) = &self.api_key {
            figment = figment.merge(Serialized::default("api.api_key", v));
        }
        if let Some(v) = &self.start_timestamp {
            figment = figment.merge(Serialized::default("retrieval.start_timestamp", v));
        }
        if let Some(v) = self.concurrency_limit {
            figment = figment.merge(Serialized::default("retrieval.concurrency_limit", v));
        }
        if let Some(v) = self.max_rounds {
            figment = figment.merge(Serialized::default("retrieval.max_rounds", v));
        }
        if let Some(v) = &self.output_dir {
            figment = figment.merge(Serialized::default("export.output_dir", v));
        }
        figment
    }
}

/// Load configuration from an optional file, then environment variables,
/// then `overrides`.
pub fn load_config_layered(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();
    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    overrides
        .apply(figment)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
