//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use edumark_site::Site;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Remote and local documents.
    pub(crate) site: Arc<Site>,
    /// Log renderer warnings.
    pub(crate) verbose: bool,
    /// Application version for `ETag`s.
    pub(crate) version: String,
}
