//! Axum web server adapter for vidrelay.
//!
//! Exposes `POST /download?message=...` and `GET /health`, and wires the
//! reqwest backend adapters into the core dispatcher.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, DEFAULT_PORT, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
