//! Shared application state type.

use crate::bootstrap::AxumContext;
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// Read-only after bootstrap; concurrent requests share nothing mutable.
pub type AppState = Arc<AxumContext>;
