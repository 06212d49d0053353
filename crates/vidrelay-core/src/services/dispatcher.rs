//! Download dispatcher - routes a message to the right backend.
//!
//! Two paths:
//! - URLs containing the platform marker go to the platform backend, which
//!   answers in a single call with either a video or a JSON status.
//! - Everything else goes through the generic job backend:
//!   `SUBMITTED -> POLLING -> {FOUND -> FETCHED} | TIMEOUT`.
//!
//! Every backend call is awaited in sequence; a request never fans out.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::DispatchSettings;
use crate::domain::{
    BackendResponse, DEFAULT_VIDEO_CONTENT_TYPE, DispatchOutcome, DownloadRequest, HistoryListing,
    JobSubmission, VideoArtifact,
};
use crate::error::DispatchError;
use crate::filename::filename_from_content_disposition;
use crate::ports::{JobBackendPort, PlatformBackendPort};

/// Status value the generic backend returns for an accepted job.
const SUBMIT_OK: &str = "ok";

/// Routes download requests to the platform or generic backend.
pub struct DownloadDispatcher {
    platform: Arc<dyn PlatformBackendPort>,
    jobs: Arc<dyn JobBackendPort>,
    settings: DispatchSettings,
}

impl DownloadDispatcher {
    pub fn new(
        platform: Arc<dyn PlatformBackendPort>,
        jobs: Arc<dyn JobBackendPort>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            platform,
            jobs,
            settings,
        }
    }

    pub const fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Whether `url` is served by the platform backend.
    pub fn is_platform_url(&self, url: &str) -> bool {
        url.contains(&self.settings.platform_marker)
    }

    /// Handle one download request end to end.
    pub async fn dispatch(
        &self,
        request: &DownloadRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let url = request
            .url()
            .ok_or_else(|| DispatchError::InvalidInput("Invalid URL".to_string()))?;

        if self.is_platform_url(url) {
            info!(url = %url, backend = "platform", "Dispatching download");
            self.fetch_from_platform(url).await
        } else {
            info!(url = %url, backend = "generic", "Dispatching download");
            self.fetch_from_jobs(url)
                .await
                .map(DispatchOutcome::Artifact)
        }
    }

    /// Platform path: one call, video or JSON.
    async fn fetch_from_platform(&self, url: &str) -> Result<DispatchOutcome, DispatchError> {
        let response = self.platform.fetch(url).await?;

        if response.is_video() {
            let filename = response
                .content_disposition
                .as_deref()
                .and_then(filename_from_content_disposition)
                .ok_or(DispatchError::MissingFilename)?;
            debug!(filename = %filename, bytes = response.body.len(), "Platform returned video");

            let content_type = response
                .content_type
                .unwrap_or_else(|| DEFAULT_VIDEO_CONTENT_TYPE.to_string());
            return Ok(DispatchOutcome::Artifact(VideoArtifact {
                body: response.body,
                content_type,
                filename,
            }));
        }

        let body: serde_json::Value = response.parse_json().map_err(|e| {
            DispatchError::InvalidResponse(format!("platform backend returned non-JSON body: {e}"))
        })?;
        debug!(status = response.status, "Relaying platform JSON");
        Ok(DispatchOutcome::Relay {
            status: response.status,
            body,
        })
    }

    /// Generic path: submit, poll, fetch.
    async fn fetch_from_jobs(&self, url: &str) -> Result<VideoArtifact, DispatchError> {
        self.submit(url).await?;
        let filename = self.wait_for_filename(url).await?;
        self.fetch_artifact(&filename).await
    }

    async fn submit(&self, url: &str) -> Result<(), DispatchError> {
        let job = JobSubmission {
            url: url.to_string(),
            quality: self.settings.quality.clone(),
            format: self.settings.format.clone(),
        };
        let response = self.jobs.submit(&job).await?;

        if response.status != 200 {
            warn!(status = response.status, "Generic backend refused job");
            return Err(DispatchError::BackendRejected {
                status: response.status,
                body: response.json_or_text(),
            });
        }

        let body = response.json_or_text();
        if body.get("status").and_then(serde_json::Value::as_str) != Some(SUBMIT_OK) {
            warn!(body = %body, "Generic backend did not accept job");
            return Err(DispatchError::BackendRejected { status: 400, body });
        }
        Ok(())
    }

    /// Poll `/history` until a finished entry for `url` appears.
    async fn wait_for_filename(&self, url: &str) -> Result<String, DispatchError> {
        let poll = self.settings.poll;

        for attempt in 1..=poll.max_attempts {
            let response = self.jobs.history().await?;
            let listing = parse_history(&response)?;
            debug!(attempt, done = listing.done.len(), history = ?listing, "Polled history");

            if let Some(filename) = listing.ready_filename_for(url) {
                info!(attempt, filename = %filename, "Download finished");
                return Ok(filename.to_string());
            }

            if attempt < poll.max_attempts {
                tokio::time::sleep(poll.interval).await;
            }
        }

        warn!(url = %url, attempts = poll.max_attempts, "Gave up waiting for download");
        Err(DispatchError::Timeout {
            attempts: poll.max_attempts,
        })
    }

    async fn fetch_artifact(&self, filename: &str) -> Result<VideoArtifact, DispatchError> {
        let response = self.jobs.download(filename).await?;

        if !response.is_success() {
            warn!(status = response.status, filename = %filename, "Artifact download refused");
            return Err(DispatchError::BackendRejected {
                status: response.status,
                body: response.json_or_text(),
            });
        }

        Ok(VideoArtifact {
            content_type: response
                .content_type
                .unwrap_or_else(|| DEFAULT_VIDEO_CONTENT_TYPE.to_string()),
            body: response.body,
            filename: filename.to_string(),
        })
    }
}

fn parse_history(response: &BackendResponse) -> Result<HistoryListing, DispatchError> {
    response.parse_json().map_err(|e| {
        DispatchError::InvalidResponse(format!(
            "history returned status {} with undecodable body: {e}",
            response.status
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::config::PollPolicy;
    use crate::error::BackendError;
    use crate::ports::{MockJobBackendPort, MockPlatformBackendPort};

    const GENERIC_URL: &str = "https://www.youtube.com/watch?v=abc123XYZ";

    fn dispatcher(
        platform: MockPlatformBackendPort,
        jobs: MockJobBackendPort,
        poll: PollPolicy,
    ) -> DownloadDispatcher {
        DownloadDispatcher::new(
            Arc::new(platform),
            Arc::new(jobs),
            DispatchSettings {
                poll,
                ..DispatchSettings::default()
            },
        )
    }

    fn fast_poll(max_attempts: u32) -> PollPolicy {
        PollPolicy::new(max_attempts, Duration::from_millis(1))
    }

    fn submit_ok(jobs: &mut MockJobBackendPort) {
        jobs.expect_submit()
            .times(1)
            .returning(|_| Ok(BackendResponse::json(200, &json!({"status": "ok"}))));
    }

    #[tokio::test]
    async fn test_message_without_url_is_invalid_input() {
        let mut platform = MockPlatformBackendPort::new();
        platform.expect_fetch().never();
        let mut jobs = MockJobBackendPort::new();
        jobs.expect_submit().never();

        let d = dispatcher(platform, jobs, fast_poll(1));
        let err = d
            .dispatch(&DownloadRequest::new("no link in here"))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::InvalidInput(ref m) if m == "Invalid URL"));
        assert_eq!(err.suggested_status_code(), 400);
    }

    #[tokio::test]
    async fn test_platform_video_is_relayed_byte_for_byte() {
        let mut platform = MockPlatformBackendPort::new();
        platform
            .expect_fetch()
            .withf(|url| url == "https://www.douyin.com/video/123")
            .times(1)
            .returning(|_| {
                Ok(BackendResponse::new(200, Bytes::from_static(&[0, 1, 2, 255]))
                    .with_content_type("video/mp4")
                    .with_content_disposition(r#"attachment; filename="测试.mp4""#))
            });
        let jobs = MockJobBackendPort::new();

        let d = dispatcher(platform, jobs, fast_poll(1));
        let outcome = d
            .dispatch(&DownloadRequest::new(
                "check this https://www.douyin.com/video/123 out https://www.douyin.com/video/456",
            ))
            .await
            .unwrap();

        let DispatchOutcome::Artifact(artifact) = outcome else {
            panic!("expected artifact, got {outcome:?}");
        };
        assert_eq!(&artifact.body[..], &[0, 1, 2, 255]);
        assert_eq!(artifact.content_type, "video/mp4");
        assert_eq!(artifact.filename, "测试.mp4");
    }

    #[tokio::test]
    async fn test_platform_video_without_disposition_fails_closed() {
        let mut platform = MockPlatformBackendPort::new();
        platform
            .expect_fetch()
            .returning(|_| Ok(BackendResponse::new(200, "bytes").with_content_type("video/mp4")));

        let d = dispatcher(platform, MockJobBackendPort::new(), fast_poll(1));
        let err = d
            .dispatch(&DownloadRequest::new("https://v.douyin.com/xyz/"))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::MissingFilename));
        assert_eq!(err.suggested_status_code(), 502);
    }

    #[tokio::test]
    async fn test_platform_json_is_relayed_with_status() {
        let mut platform = MockPlatformBackendPort::new();
        platform.expect_fetch().returning(|_| {
            Ok(BackendResponse::json(
                404,
                &json!({"detail": "video not found"}),
            ))
        });

        let d = dispatcher(platform, MockJobBackendPort::new(), fast_poll(1));
        let outcome = d
            .dispatch(&DownloadRequest::new("https://www.douyin.com/video/1"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Relay {
                status: 404,
                body: json!({"detail": "video not found"}),
            }
        );
    }

    #[tokio::test]
    async fn test_platform_non_json_body_is_invalid_response() {
        let mut platform = MockPlatformBackendPort::new();
        platform
            .expect_fetch()
            .returning(|_| Ok(BackendResponse::new(200, "<html>").with_content_type("text/html")));

        let d = dispatcher(platform, MockJobBackendPort::new(), fast_poll(1));
        let err = d
            .dispatch(&DownloadRequest::new("https://www.douyin.com/video/1"))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_platform_network_failure_is_network_error() {
        let mut platform = MockPlatformBackendPort::new();
        platform
            .expect_fetch()
            .returning(|_| Err(BackendError::Request("connection refused".into())));

        let d = dispatcher(platform, MockJobBackendPort::new(), fast_poll(1));
        let err = d
            .dispatch(&DownloadRequest::new("https://www.douyin.com/video/1"))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Network(ref m) if m == "connection refused"));
    }

    #[tokio::test]
    async fn test_submit_sends_configured_job() {
        let mut jobs = MockJobBackendPort::new();
        jobs.expect_submit()
            .withf(|job| job.url == GENERIC_URL && job.quality == "1080p" && job.format == "mp4")
            .times(1)
            .returning(|_| Ok(BackendResponse::json(200, &json!({"status": "ok"}))));
        jobs.expect_history().times(1).returning(|| {
            Ok(BackendResponse::json(
                200,
                &json!({"done": [{"id": "abc123XYZ", "filename": "out.mp4"}]}),
            ))
        });
        jobs.expect_download()
            .withf(|name| name == "out.mp4")
            .times(1)
            .returning(|_| Ok(BackendResponse::new(200, "video")));

        let d = dispatcher(MockPlatformBackendPort::new(), jobs, fast_poll(3));
        let outcome = d
            .dispatch(&DownloadRequest::new(format!("grab {GENERIC_URL} please")))
            .await
            .unwrap();

        let DispatchOutcome::Artifact(artifact) = outcome else {
            panic!("expected artifact");
        };
        assert_eq!(&artifact.body[..], b"video");
        assert_eq!(artifact.content_type, DEFAULT_VIDEO_CONTENT_TYPE);
        assert_eq!(artifact.filename, "out.mp4");
    }

    #[tokio::test]
    async fn test_submit_not_ok_never_polls() {
        let mut jobs = MockJobBackendPort::new();
        jobs.expect_submit().times(1).returning(|_| {
            Ok(BackendResponse::json(
                200,
                &json!({"status": "error", "msg": "unsupported"}),
            ))
        });
        jobs.expect_history().never();
        jobs.expect_download().never();

        let d = dispatcher(MockPlatformBackendPort::new(), jobs, fast_poll(3));
        let err = d
            .dispatch(&DownloadRequest::new(GENERIC_URL))
            .await
            .unwrap_err();

        assert_eq!(err.suggested_status_code(), 400);
        assert_eq!(err.payload(), json!({"status": "error", "msg": "unsupported"}));
    }

    #[tokio::test]
    async fn test_submit_non_200_relays_status() {
        let mut jobs = MockJobBackendPort::new();
        jobs.expect_submit()
            .returning(|_| Ok(BackendResponse::new(503, "maintenance")));
        jobs.expect_history().never();

        let d = dispatcher(MockPlatformBackendPort::new(), jobs, fast_poll(3));
        let err = d
            .dispatch(&DownloadRequest::new(GENERIC_URL))
            .await
            .unwrap_err();

        assert_eq!(err.suggested_status_code(), 503);
        assert_eq!(err.payload(), json!("maintenance"));
    }

    #[tokio::test]
    async fn test_polls_until_entry_appears() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut jobs = MockJobBackendPort::new();
        submit_ok(&mut jobs);
        let counter = Arc::clone(&calls);
        jobs.expect_history().times(5).returning(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let body = if n < 4 {
                json!({"done": []})
            } else {
                json!({"done": [{"id": "abc123XYZ", "filename": "out.mp4"}]})
            };
            Ok(BackendResponse::json(200, &body))
        });
        jobs.expect_download()
            .times(1)
            .returning(|_| Ok(BackendResponse::new(200, "video").with_content_type("video/webm")));

        let d = dispatcher(MockPlatformBackendPort::new(), jobs, fast_poll(60));
        let outcome = d.dispatch(&DownloadRequest::new(GENERIC_URL)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        let DispatchOutcome::Artifact(artifact) = outcome else {
            panic!("expected artifact");
        };
        assert_eq!(artifact.content_type, "video/webm");
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_exhaustion_times_out_after_max_attempts() {
        let mut jobs = MockJobBackendPort::new();
        submit_ok(&mut jobs);
        jobs.expect_history().times(60).returning(|| {
            Ok(BackendResponse::json(
                200,
                &json!({"done": [{"id": "someone-else", "filename": "x.mp4"}]}),
            ))
        });
        jobs.expect_download().never();

        let d = dispatcher(
            MockPlatformBackendPort::new(),
            jobs,
            PollPolicy::default(),
        );
        let started = tokio::time::Instant::now();
        let err = d
            .dispatch(&DownloadRequest::new(GENERIC_URL))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Timeout { attempts: 60 }));
        assert_eq!(err.to_string(), "Download timeout");
        // 59 sleeps of 5 seconds between 60 polls.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(59 * 5), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(60 * 5), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_undecodable_history_is_invalid_response() {
        let mut jobs = MockJobBackendPort::new();
        submit_ok(&mut jobs);
        jobs.expect_history()
            .times(1)
            .returning(|| Ok(BackendResponse::new(502, "Bad Gateway")));
        jobs.expect_download().never();

        let d = dispatcher(MockPlatformBackendPort::new(), jobs, fast_poll(5));
        let err = d
            .dispatch(&DownloadRequest::new(GENERIC_URL))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_history_network_failure_aborts() {
        let mut jobs = MockJobBackendPort::new();
        submit_ok(&mut jobs);
        jobs.expect_history()
            .times(1)
            .returning(|| Err(BackendError::Timeout("operation timed out".into())));

        let d = dispatcher(MockPlatformBackendPort::new(), jobs, fast_poll(5));
        let err = d
            .dispatch(&DownloadRequest::new(GENERIC_URL))
            .await
            .unwrap_err();

        assert_eq!(err.suggested_status_code(), 502);
    }

    #[tokio::test]
    async fn test_download_refusal_relays_status() {
        let mut jobs = MockJobBackendPort::new();
        submit_ok(&mut jobs);
        jobs.expect_history().returning(|| {
            Ok(BackendResponse::json(
                200,
                &json!({"done": [{"id": "abc123XYZ", "filename": "gone.mp4"}]}),
            ))
        });
        jobs.expect_download()
            .returning(|_| Ok(BackendResponse::new(404, "404: Not Found")));

        let d = dispatcher(MockPlatformBackendPort::new(), jobs, fast_poll(5));
        let err = d
            .dispatch(&DownloadRequest::new(GENERIC_URL))
            .await
            .unwrap_err();

        assert_eq!(err.suggested_status_code(), 404);
    }

    #[test]
    fn test_platform_marker_routing() {
        let d = dispatcher(
            MockPlatformBackendPort::new(),
            MockJobBackendPort::new(),
            fast_poll(1),
        );
        assert!(d.is_platform_url("https://v.douyin.com/abc/"));
        assert!(!d.is_platform_url(GENERIC_URL));
    }
}
