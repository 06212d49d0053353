//! Domain types for a single relay exchange.
//!
//! Nothing here outlives the inbound request that created it.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::extract::first_url;
use crate::filename::attachment_disposition;

/// Content type assumed when a backend does not announce one.
pub const DEFAULT_VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// A free-text message that should contain a video URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    message: String,
}

impl DownloadRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The first URL in the message. Later URLs are ignored.
    pub fn url(&self) -> Option<&str> {
        first_url(&self.message)
    }
}

/// Job payload for the generic backend's `/add` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSubmission {
    pub url: String,
    pub quality: String,
    pub format: String,
}

/// One finished job in the generic backend's history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl HistoryEntry {
    /// Whether this entry belongs to `url`.
    ///
    /// The backend never echoes a job id on submit, so correspondence is
    /// inferred by the id occurring inside the submitted URL. An empty id
    /// would match everything and is rejected.
    pub fn matches(&self, url: &str) -> bool {
        self.id
            .as_deref()
            .is_some_and(|id| !id.is_empty() && url.contains(id))
    }

    /// The output filename, once the backend has written one.
    pub fn ready_filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|name| !name.is_empty())
    }
}

/// Body of the generic backend's `/history` endpoint.
///
/// Only the `done` list matters; `queue`, `pending` and friends are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryListing {
    #[serde(default)]
    pub done: Vec<HistoryEntry>,
}

impl HistoryListing {
    /// Filename of the first finished entry matching `url`.
    pub fn ready_filename_for(&self, url: &str) -> Option<&str> {
        self.done
            .iter()
            .filter(|entry| entry.matches(url))
            .find_map(HistoryEntry::ready_filename)
    }
}

/// A video ready to be sent back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    pub body: Bytes,
    pub content_type: String,
    pub filename: String,
}

impl VideoArtifact {
    /// `Content-Disposition` value announcing this artifact as an attachment.
    pub fn content_disposition(&self) -> String {
        attachment_disposition(&self.filename)
    }
}

/// Raw answer from a backend call, independent of the HTTP client used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Bytes,
}

impl BackendResponse {
    /// A plain response with only a status and body, mostly for tests.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: None,
            content_disposition: None,
            body: body.into(),
        }
    }

    /// An `application/json` response carrying `value`.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            content_disposition: None,
            body: Bytes::from(value.to_string()),
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn with_content_disposition(mut self, value: impl Into<String>) -> Self {
        self.content_disposition = Some(value.into());
        self
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Whether the backend answered with a video payload.
    pub fn is_video(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("video/"))
    }

    /// Parse the body as JSON.
    pub fn parse_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The body as JSON, falling back to a JSON string of the lossy text.
    ///
    /// Used when relaying backend errors whose body may not be JSON at all.
    pub fn json_or_text(&self) -> serde_json::Value {
        self.parse_json().unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&self.body).into_owned())
        })
    }
}

/// Final result of a dispatch that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A video to stream back as an attachment.
    Artifact(VideoArtifact),
    /// A JSON answer from the platform backend, relayed with its status.
    Relay {
        status: u16,
        body: serde_json::Value,
    },
}
