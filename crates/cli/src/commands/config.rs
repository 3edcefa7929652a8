//! Config command - show the effective configuration.

use std::path::Path;

use anyhow::{Context, Result};

use uinlookup_core::{load_config_layered, validate_config, ConfigOverrides, SanitizedConfig};

/// Execute the config command.
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = load_config_layered(config_path, &ConfigOverrides::default())
        .context("Failed to load configuration")?;

    let sanitized = SanitizedConfig::from(&config);
    println!("{}", serde_json::to_string_pretty(&sanitized)?);

    if let Err(e) = validate_config(&config) {
        println!();
        println!("Warning: {e}");
    }
    Ok(())
}
