// SiteDesk - command-line dashboard client

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sitedesk_app::cli::{self, Cli};
use sitedesk_common::config::{Config, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries command output
    let filter = EnvFilter::new(&config.rust_log);
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .pretty()
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init(),
    }

    info!(storage_dir = %config.storage_dir.display(), "Starting SiteDesk client");

    let app = sitedesk_app::create_app(&config).await.map_err(|e| {
        error!("Failed to create application: {}", e);
        e
    })?;

    cli::run(&app, cli.command).await
}
