//! Entry point for the plovr-bridge command line.

use std::process::ExitCode;

use clap::Parser;
use plovr_bridge::cli::Cli;
use plovr_bridge::commands;
use plovr_bridge::services::ConsoleSink;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plovr_bridge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match commands::run(cli.command, &ConsoleSink).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
