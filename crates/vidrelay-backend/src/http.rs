//! Shared reqwest plumbing for the backend adapters.

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use vidrelay_core::{BackendError, BackendResponse};

use crate::config::HttpClientConfig;

/// Build the HTTP client shared by both adapters.
///
/// The timeout bounds connecting and each read, not the whole exchange.
pub fn build_client(config: &HttpClientConfig) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .connect_timeout(config.timeout)
        .read_timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .build()
        .map_err(|e| BackendError::Request(format!("failed to create HTTP client: {e}")))
}

/// Map a reqwest failure onto the port error.
pub(crate) fn request_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else {
        BackendError::Request(err.to_string())
    }
}

/// Read a whole response into a [`BackendResponse`].
///
/// `Content-Disposition` is decoded from raw bytes: backends commonly put
/// unescaped UTF-8 filenames there, which `HeaderValue::to_str` rejects.
pub(crate) async fn read_response(
    response: reqwest::Response,
) -> Result<BackendResponse, BackendError> {
    let status = response.status().as_u16();
    let headers = response.headers();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let content_disposition = headers
        .get(CONTENT_DISPOSITION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    let body = response.bytes().await.map_err(request_error)?;

    Ok(BackendResponse {
        status,
        content_type,
        content_disposition,
        body,
    })
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
