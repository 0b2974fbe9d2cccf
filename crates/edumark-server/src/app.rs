//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::home::get_home))
        .route("/view/{filename}", get(handlers::view::get_remote_page))
        .route("/local/{filename}", get(handlers::local::get_local_page))
        .route("/local/{filename}/mtime", get(handlers::local::get_local_mtime))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}
