//! Core domain for vidrelay.
//!
//! Holds the transport-neutral pieces of the relay: message parsing,
//! backend ports, the dispatch service and its configuration. Adapters
//! (`vidrelay-backend`, `vidrelay-axum`) depend on this crate, never the
//! other way round.

pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod filename;
pub mod ports;
pub mod services;

// Re-export commonly used types for convenience
pub use config::{ConfigError, DispatchSettings, PollPolicy, RelayConfig};
pub use domain::{
    BackendResponse, DEFAULT_VIDEO_CONTENT_TYPE, DispatchOutcome, DownloadRequest, HistoryEntry,
    HistoryListing, JobSubmission, VideoArtifact,
};
pub use error::{BackendError, DispatchError};
pub use extract::{extract_urls, first_url};
pub use filename::{attachment_disposition, encode_filename, filename_from_content_disposition};
pub use ports::{JobBackendPort, PlatformBackendPort};
pub use services::DownloadDispatcher;
