//! Retrieve command - import, look up every subject, export.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use tracing::{info, warn};

use uinlookup_core::{
    export_to_dir, load_config_layered, validate_config, ConfigOverrides, HttpResultsClient,
    RetrievalEvent, RetrievalOrchestrator, RetrievalStats, SanitizedConfig,
};

use crate::{import_sheets, print_log, render_import, render_stats};

/// Arguments for the retrieve command.
#[derive(Debug, Args)]
pub struct RetrieveArgs {
    /// CSV sheets to import, in order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Results API base URL (must end in /v2).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Results API bearer token.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Only consider results produced at or after this timestamp.
    #[arg(long)]
    pub start_timestamp: Option<String>,

    /// Maximum number of lookups in flight.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Number of runs over subjects still lacking a result.
    #[arg(long)]
    pub rounds: Option<u32>,

    /// Directory the export file is written to.
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,
}

impl RetrieveArgs {
    /// Command-line values layered over file and environment settings.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            start_timestamp: self.start_timestamp.clone(),
            concurrency_limit: self.concurrency,
            max_rounds: self.rounds,
            output_dir: self.output_dir.clone(),
        }
    }
}

/// Execute the retrieve command.
///
/// # Errors
///
/// Fails on unreadable sheets, invalid configuration or an unwritable
/// export. Individual lookup failures only show up in the session log.
pub async fn execute(args: RetrieveArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config_layered(config_path, &args.overrides())
        .context("Failed to load configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    info!(config = ?SanitizedConfig::from(&config), "Configuration loaded");

    let mut session = import_sheets(&args.files)?;
    println!("{}", render_import(&session.stats, session.store.len()));
    if session.store.is_empty() {
        print_log(&session.log);
        anyhow::bail!("No valid subjects to look up");
    }

    let client = HttpResultsClient::new(&config.api).context("Failed to create HTTP client")?;
    let orchestrator = RetrievalOrchestrator::new(config.retrieval.clone(), Arc::new(client))
        .with_callback(Arc::new(|event: &RetrievalEvent| {
            if let RetrievalEvent::Progress { remaining, queued } = event {
                eprintln!("Remaining: {remaining} (queued: {queued})");
            }
        }));

    let mut stats = RetrievalStats::calculate(&session.store);
    for round in 1..=config.retrieval.max_rounds {
        if session.store.pending_keys().is_empty() {
            break;
        }

        info!(round, "Starting retrieval round");
        let report = orchestrator
            .run(&mut session.store, &mut session.log)
            .await
            .context("Retrieval run failed")?;
        stats = report.stats;

        if report.stopped_on_auth {
            warn!("Stopping after authentication failure");
            break;
        }
    }

    println!();
    println!("{}", render_stats(&stats, session.store.len()));
    print_log(&session.log);

    // Subjects answered with an empty result list still export as NO RESULT.
    if stats.awaiting_retrieval == session.store.len() {
        println!();
        println!("Nothing retrieved, no export written");
        return Ok(());
    }

    let path = export_to_dir(&session.store, &config.export.output_dir, &Local::now())
        .context("Failed to write export")?;
    println!();
    println!("Exported to {}", path.display());
    Ok(())
}
