//! tfile - Entry Point
//!
//! Shares one directory over HTTP for browsing, upload and download.

use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use tfile::cli::Cli;
use tfile::server::{Server, ServerConfig};
use tfile::utils::logging::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging();

    let config = match ServerConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Launching file server...");

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.start().await {
        error!("{}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
