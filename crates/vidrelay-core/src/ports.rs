//! Port definitions for the two download backends.
//!
//! Ports return raw [`BackendResponse`]s; interpreting status codes, JSON
//! bodies and headers is the dispatcher's job. Implementations only turn
//! transport failures into [`BackendError`].

use async_trait::async_trait;

use crate::domain::{BackendResponse, JobSubmission};
use crate::error::BackendError;

/// Platform-specific backend: one request per video.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformBackendPort: Send + Sync {
    /// `GET {endpoint}?url=<url>`.
    async fn fetch(&self, url: &str) -> Result<BackendResponse, BackendError>;
}

/// Generic job backend: submit, watch the history, then download.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobBackendPort: Send + Sync {
    /// `POST {base}/add` with the job as JSON.
    async fn submit(&self, job: &JobSubmission) -> Result<BackendResponse, BackendError>;

    /// `GET {base}/history`.
    async fn history(&self) -> Result<BackendResponse, BackendError>;

    /// `GET {base}/download/{filename}`.
    async fn download(&self, filename: &str) -> Result<BackendResponse, BackendError>;
}
