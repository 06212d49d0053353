//! Command-line arguments for the `vidrelay` binary.

use std::path::PathBuf;

use clap::Parser;

/// Message-to-video download server.
///
/// Every flag can also be set from the environment (or a `.env` file).
#[derive(Debug, Parser)]
#[command(name = "vidrelay")]
#[command(about = "Relay video downloads to the right backend")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON file holding the backend endpoints
    #[arg(short, long, env = "VIDRELAY_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Interface to bind
    #[arg(long, env = "VIDRELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "VIDRELAY_PORT", default_value_t = vidrelay_axum::DEFAULT_PORT)]
    pub port: u16,
}
