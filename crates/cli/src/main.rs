//! uinlookup - batch results lookup by national ID.
//!
//! The main entry point for the `uinlookup` CLI binary.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uinlookup_cli::{commands, Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config_path();

    let result = match cli.command {
        Commands::Import(args) => commands::import::execute(&args),
        Commands::Retrieve(args) => commands::retrieve::execute(args, config_path.as_deref()).await,
        Commands::Config => commands::config::execute(config_path.as_deref()),
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
