//! Import command - validate sheets without contacting the API.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::{import_sheets, print_log, render_import};

/// Arguments for the import command.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// CSV sheets to import, in order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the import counters as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the import command.
pub fn execute(args: &ImportArgs) -> Result<()> {
    let session = import_sheets(&args.files)?;
    info!(
        files = args.files.len(),
        subjects = session.store.len(),
        "Import finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session.stats)?);
    } else {
        println!("{}", render_import(&session.stats, session.store.len()));
    }
    print_log(&session.log);
    Ok(())
}
