//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where the reqwest adapters are wired into
//! the core dispatcher.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use vidrelay_backend::{HttpClientConfig, JobServerClient, PlatformClient, build_client};
use vidrelay_core::{DownloadDispatcher, JobBackendPort, PlatformBackendPort, RelayConfig};

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 8000;

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// Backend endpoints and dispatch tuning.
    pub relay: RelayConfig,
}

impl ServerConfig {
    pub fn new(relay: RelayConfig) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            relay,
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `host:port` as a bindable address string.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// Routes each request to the platform or generic backend.
    pub dispatcher: Arc<DownloadDispatcher>,
}

/// Build the dispatcher and its backend adapters from `relay`.
pub fn bootstrap(relay: &RelayConfig) -> Result<AxumContext> {
    let client = build_client(&HttpClientConfig::new().with_timeout(relay.request_timeout))
        .context("Failed to build backend HTTP client")?;

    let platform: Arc<dyn PlatformBackendPort> = Arc::new(PlatformClient::new(
        client.clone(),
        relay.platform_endpoint.clone(),
    ));
    let jobs: Arc<dyn JobBackendPort> =
        Arc::new(JobServerClient::new(client, relay.generic_endpoint.clone()));

    info!(
        target: "vidrelay.config",
        platform_endpoint = %relay.platform_endpoint,
        generic_endpoint = %relay.generic_endpoint,
        platform_marker = %relay.platform_marker,
        poll_attempts = relay.poll.max_attempts,
        poll_interval = ?relay.poll.interval,
        request_timeout = ?relay.request_timeout,
        "Backends configured"
    );

    let dispatcher = DownloadDispatcher::new(platform, jobs, relay.dispatch_settings());
    Ok(AxumContext {
        dispatcher: Arc::new(dispatcher),
    })
}

/// Start the web server and run until Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap(&config.relay)?;
    let app = crate::routes::create_router(ctx);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local: SocketAddr = listener.local_addr()?;
    info!("vidrelay listening on http://{local}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("vidrelay shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
