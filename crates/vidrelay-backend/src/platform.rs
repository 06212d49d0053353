//! Adapter for the platform-specific backend.

use async_trait::async_trait;
use tracing::{debug, error};
use vidrelay_core::{BackendError, BackendResponse, PlatformBackendPort};

use crate::http::{read_response, request_error};

/// Client for a backend that resolves a platform URL in one call.
///
/// The backend answers `GET {endpoint}?url=<url>` with either the video
/// itself or a JSON document.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PlatformClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PlatformBackendPort for PlatformClient {
    async fn fetch(&self, url: &str) -> Result<BackendResponse, BackendError> {
        debug!(endpoint = %self.endpoint, url = %url, "GET platform backend");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach platform backend: {e}");
                request_error(e)
            })?;

        read_response(response).await
    }
}
