//! Adapter for the generic job backend.
//!
//! The backend exposes a small queue API:
//! - `POST /add` takes `{url, quality, format}` and answers `{"status": "ok"}`
//! - `GET /history` lists jobs, finished ones under `done`
//! - `GET /download/{filename}` serves a finished file

use async_trait::async_trait;
use tracing::{debug, error};
use vidrelay_core::{BackendError, BackendResponse, JobBackendPort, JobSubmission};

use crate::http::{join_url, read_response, request_error};

/// Client for the generic job backend.
#[derive(Debug, Clone)]
pub struct JobServerClient {
    client: reqwest::Client,
    base_url: String,
}

impl JobServerClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<BackendResponse, BackendError> {
        let response = request.send().await.map_err(|e| {
            error!(base_url = %self.base_url, "Failed to reach job backend: {e}");
            request_error(e)
        })?;
        read_response(response).await
    }
}

#[async_trait]
impl JobBackendPort for JobServerClient {
    async fn submit(&self, job: &JobSubmission) -> Result<BackendResponse, BackendError> {
        let url = join_url(&self.base_url, "add");
        debug!(url = %url, job_url = %job.url, "POST job");
        self.send(self.client.post(url).json(job)).await
    }

    async fn history(&self) -> Result<BackendResponse, BackendError> {
        let url = join_url(&self.base_url, "history");
        self.send(self.client.get(url)).await
    }

    async fn download(&self, filename: &str) -> Result<BackendResponse, BackendError> {
        let url = join_url(&self.base_url, &download_path(filename));
        debug!(url = %url, "GET artifact");
        self.send(self.client.get(url)).await
    }
}

/// `download/{filename}`, percent-encoding each `/`-separated segment.
///
/// Backends may report files in subfolders (`folder/clip.mp4`); the
/// separators stay literal.
fn download_path(filename: &str) -> String {
    let segments: Vec<_> = filename.split('/').map(urlencoding::encode).collect();
    format!("download/{}", segments.join("/"))
}
