//! Error types for dispatching downloads.
//!
//! `BackendError` is what the backend ports report; `DispatchError` is what
//! the dispatcher reports to adapters. Adapters own the mapping to their own
//! transport (HTTP status codes for the Axum adapter).

use thiserror::Error;

/// Transport-level failure talking to a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request could not be sent or the response could not be read.
    #[error("{0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("{0}")]
    Timeout(String),
}

/// Errors that can end a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The inbound message is unusable (no URL, missing parameter).
    #[error("{0}")]
    InvalidInput(String),

    /// A backend answered but refused the job.
    ///
    /// `body` is relayed to the caller as is.
    #[error("Backend rejected the request with status {status}")]
    BackendRejected {
        status: u16,
        body: serde_json::Value,
    },

    /// A backend could not be reached or did not answer in time.
    #[error("{0}")]
    Network(String),

    /// The poll loop ran out of attempts before the job showed up.
    #[error("Download timeout")]
    Timeout { attempts: u32 },

    /// A video response carried no usable `Content-Disposition` filename.
    #[error("Backend response is missing a filename")]
    MissingFilename,

    /// A backend answered with a body we could not make sense of.
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

impl DispatchError {
    /// Returns a suggested HTTP status code for this error.
    #[must_use]
    pub const fn suggested_status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::BackendRejected { status, .. } => *status,
            Self::Timeout { .. } => 408,
            Self::Network(_) | Self::MissingFilename | Self::InvalidResponse(_) => 502,
        }
    }

    /// Whether the failure lies with a backend or the relay (5xx) rather
    /// than with the caller's input or a backend's refusal.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.suggested_status_code() >= 500
    }

    /// The value placed under `"error"` in a JSON error body.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            Self::BackendRejected { body, .. } => body.clone(),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

impl From<BackendError> for DispatchError {
    fn from(err: BackendError) -> Self {
        Self::Network(err.to_string())
    }
}
