//! Axum-specific error types and mappings.
//!
//! Every failure leaves the server as `{"error": <string-or-object>}` with a
//! status code derived from the core [`DispatchError`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use vidrelay_core::DispatchError;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (no URL, missing parameter).
    #[error("{0}")]
    BadRequest(String),

    /// A backend refused the job; its status and body are passed through.
    #[error("Backend returned {status}")]
    Relayed {
        status: StatusCode,
        body: serde_json::Value,
    },

    /// The poll loop gave up.
    #[error("{0}")]
    RequestTimeout(String),

    /// A backend was unreachable or answered with garbage.
    #[error("{0}")]
    BadGateway(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: serde_json::Value,
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Relayed { status, .. } => *status,
            Self::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            Self::Relayed { body, .. } => body,
            Self::BadRequest(msg) | Self::RequestTimeout(msg) | Self::BadGateway(msg) => {
                serde_json::Value::String(msg)
            }
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<DispatchError> for HttpError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::InvalidInput(msg) => Self::BadRequest(msg),
            DispatchError::BackendRejected { status, body } => Self::Relayed {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                body,
            },
            err @ DispatchError::Timeout { .. } => Self::RequestTimeout(err.to_string()),
            err @ (DispatchError::Network(_)
            | DispatchError::MissingFilename
            | DispatchError::InvalidResponse(_)) => Self::BadGateway(err.to_string()),
        }
    }
}
