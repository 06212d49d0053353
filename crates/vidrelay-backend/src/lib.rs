//! HTTP adapters for the vidrelay backend ports.
//!
//! Both adapters share one [`reqwest::Client`] (and so one connection pool),
//! built from [`HttpClientConfig`]. They report transport failures as
//! [`vidrelay_core::BackendError`] and hand every answer back as a raw
//! [`vidrelay_core::BackendResponse`].

#![deny(unsafe_code)]

mod config;
mod http;
mod job_server;
mod platform;

pub use config::HttpClientConfig;
pub use http::build_client;
pub use job_server::JobServerClient;
pub use platform::PlatformClient;
