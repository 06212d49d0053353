//! CLI entry point.
//!
//! Loads `.env`, reads the backend config and runs the server until Ctrl-C.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vidrelay_axum::{ServerConfig, start_server};
use vidrelay_cli::Cli;
use vidrelay_core::RelayConfig;

const DEFAULT_LOG_FILTER: &str = "info,vidrelay=debug";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before clap, so `.env` can supply VIDRELAY_* flags.
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let relay = RelayConfig::from_path(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    tracing::debug!(config = %cli.config.display(), "Loaded backend config");

    let config = ServerConfig::new(relay)
        .with_host(cli.host)
        .with_port(cli.port);

    start_server(config).await
}
