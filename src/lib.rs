pub mod cli;
pub mod config;
pub mod pipeline;
pub mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Parse the command line, initialize logging and run the chosen command.
pub fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Logs go to stderr; stdout carries the conversation and summaries.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    cli::execute(&cli)
}
