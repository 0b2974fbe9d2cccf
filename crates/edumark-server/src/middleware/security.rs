//! Security headers middleware.
//!
//! Adds security headers to all responses:
//! - Content-Security-Policy
//! - X-Content-Type-Options
//! - X-Frame-Options

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

/// Content-Security-Policy header value.
///
/// Pages load highlight.js from cdnjs and KaTeX from jsDelivr, and run small
/// inline scripts for highlighting and local preview polling.
const CSP: &str = "default-src 'self'; \
                   script-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com https://cdn.jsdelivr.net; \
                   style-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com https://cdn.jsdelivr.net; \
                   font-src 'self' data: https://cdn.jsdelivr.net; \
                   img-src 'self' data: https:; \
                   connect-src 'self'; \
                   frame-ancestors 'none'";

/// Create layer that adds Content-Security-Policy header.
pub(crate) fn csp_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static(CSP),
    )
}

/// Create layer that adds X-Content-Type-Options header.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}

/// Create layer that adds X-Frame-Options header.
pub(crate) fn frame_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    )
}
