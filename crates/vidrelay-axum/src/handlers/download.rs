//! Download handler - turns a message into a video attachment.

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{error, info, warn};
use vidrelay_core::{DispatchOutcome, DownloadRequest, VideoArtifact};

use crate::error::HttpError;
use crate::state::AppState;

/// Query string of `POST /download`.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// Free text that should contain a video URL.
    pub message: Option<String>,
}

/// Resolve the first URL in `message` to a video.
///
/// POST /download?message=...
///
/// Answers with the video as an attachment, the platform backend's JSON
/// relayed with its status, or `{"error": ...}`.
pub async fn download(
    State(state): State<AppState>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<Response, HttpError> {
    let Query(query) = query.map_err(|rejection| {
        let reason = rejection.body_text();
        warn!("Rejected query string: {reason}");
        HttpError::BadRequest(format!("Invalid query string: {reason}"))
    })?;
    let message = query
        .message
        .ok_or_else(|| HttpError::BadRequest("Missing 'message' query parameter".to_string()))?;
    let request = DownloadRequest::new(message);

    let outcome = state.dispatcher.dispatch(&request).await.map_err(|e| {
        if e.is_server_error() {
            error!("Download failed: {e}");
        } else {
            warn!("Download refused: {e}");
        }
        HttpError::from(e)
    })?;

    match outcome {
        DispatchOutcome::Artifact(artifact) => Ok(artifact_response(artifact)),
        DispatchOutcome::Relay { status, body } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            Ok((status, Json(body)).into_response())
        }
    }
}

/// Build the attachment response for a finished artifact.
fn artifact_response(artifact: VideoArtifact) -> Response {
    info!(
        filename = %artifact.filename,
        content_type = %artifact.content_type,
        bytes = artifact.body.len(),
        "Sending video"
    );

    let disposition = artifact.content_disposition();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artifact.content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(artifact.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
