//! HTTP request handlers.

pub(crate) mod home;
pub(crate) mod local;
pub(crate) mod view;

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use edumark_site::{DocumentError, RenderedPage, Site};
use md5::{Digest, Md5};

use crate::error::ServerError;
use crate::state::AppState;

/// Run a blocking site operation on the blocking pool.
pub(crate) async fn with_site<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ServerError>
where
    F: FnOnce(&Site) -> Result<T, DocumentError> + Send + 'static,
    T: Send + 'static,
{
    let site = Arc::clone(&state.site);
    let result = tokio::task::spawn_blocking(move || f(&site)).await?;
    Ok(result?)
}

/// Log renderer warnings in verbose mode.
pub(crate) fn log_warnings(state: &AppState, page: &RenderedPage) {
    if state.verbose {
        for warning in &page.content.warnings {
            tracing::warn!(filename = %page.filename, warning = %warning, "Page render warning");
        }
    }
}

/// HTML response with an `ETag`, or 304 if the client already has it.
pub(crate) fn html_response(
    state: &AppState,
    headers: &HeaderMap,
    html: String,
    extra: &[(header::HeaderName, String)],
) -> Response {
    let etag = compute_etag(&state.version, &html);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return StatusCode::NOT_MODIFIED.into_response();
    }

    let mut response = Html(html).into_response();
    let response_headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&etag) {
        response_headers.insert(header::ETAG, value);
    }
    for (name, value) in extra {
        if let Ok(value) = HeaderValue::from_str(value) {
            response_headers.insert(name.clone(), value);
        }
    }
    response
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_etag_includes_version() {
        assert_ne!(compute_etag("1.0.0", "content"), compute_etag("1.0.1", "content"));
    }

    #[test]
    fn test_compute_etag_includes_content() {
        assert_ne!(compute_etag("1.0.0", "content1"), compute_etag("1.0.0", "content2"));
    }

    #[test]
    fn test_compute_etag_format() {
        let etag = compute_etag("1.0.0", "content");

        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag.len(), 18);
    }
}
