//! # uinlookup-cli
//!
//! Command-line front end for batch results lookup.
//!
//! ## Commands
//!
//! - `uinlookup import` - Import and validate identifier sheets
//! - `uinlookup retrieve` - Import, look up every subject, export results
//! - `uinlookup config` - Show the effective configuration
//!
//! ## Configuration
//!
//! Settings come from a TOML file (`--config`, `UINLOOKUP_CONFIG` or
//! `./uinlookup.toml`), then `UINLOOKUP_`-prefixed environment variables,
//! then command-line flags.

pub mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use uinlookup_core::{
    import_file, ImportStats, NricValidator, RetrievalStats, SessionLog, SubjectStore,
};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "uinlookup.toml";

/// Batch lookup of test results by national ID.
#[derive(Debug, Parser)]
#[command(name = "uinlookup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, short = 'c', env = "UINLOOKUP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The config file to load, if any.
    ///
    /// An explicit path is always returned (so a missing file is reported);
    /// the default file is only used when present.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import and validate identifier sheets without contacting the API.
    Import(commands::import::ImportArgs),
    /// Import sheets, retrieve results and export them.
    Retrieve(commands::retrieve::RetrieveArgs),
    /// Print the effective configuration with secrets redacted.
    Config,
}

/// Everything an import produces.
#[derive(Debug, Default)]
pub struct Session {
    pub store: SubjectStore,
    pub stats: ImportStats,
    pub log: SessionLog,
}

/// Import every file in order into a fresh session.
pub fn import_sheets(files: &[PathBuf]) -> Result<Session> {
    let mut session = Session::default();
    for file in files {
        import_one(file, &mut session)?;
    }
    Ok(session)
}

fn import_one(file: &Path, session: &mut Session) -> Result<()> {
    import_file(
        file,
        &mut session.store,
        &mut session.stats,
        &mut session.log,
        &NricValidator,
    )
    .with_context(|| format!("Failed to import {}", file.display()))
}

/// Import summary, one counter per line.
pub fn render_import(stats: &ImportStats, unique: usize) -> String {
    [
        ("Rows read", stats.total_read),
        ("Unique subjects", unique),
        ("Duplicates", stats.duplicate),
        ("Invalid", stats.invalid),
    ]
    .iter()
    .map(|(label, value)| format!("{:<20}{}", format!("{label}:"), value))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Retrieval summary, one counter per line.
pub fn render_stats(stats: &RetrievalStats, total: usize) -> String {
    [
        ("Subjects", total),
        ("Retrieved", stats.retrieved),
        ("Positive", stats.positive_test_results),
        ("Negative", stats.negative_test_results),
        ("Pending", stats.pending_test_results),
        ("Invalid", stats.invalid_test_results),
        ("No result", stats.no_test_results),
        ("Awaiting retrieval", stats.awaiting_retrieval),
    ]
    .iter()
    .map(|(label, value)| format!("{:<20}{}", format!("{label}:"), value))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Print the operator log, if anything was recorded.
pub fn print_log(log: &SessionLog) {
    if log.is_empty() {
        return;
    }
    println!();
    println!("Log:");
    println!("{}", render_log(log));
}

/// One line per log entry, prefixed with its local time of day.
pub fn render_log(log: &SessionLog) -> String {
    log.entries()
        .iter()
        .map(|entry| {
            let at = entry.recorded_at.with_timezone(&chrono::Local);
            format!("  [{}] {}", at.format("%H:%M:%S"), entry.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
