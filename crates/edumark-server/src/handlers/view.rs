//! Remote documents by bare filename.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use edumark_site::PageSource;
use serde::Deserialize;

use crate::error::ServerError;
use crate::handlers::{html_response, log_warnings, with_site};
use crate::state::AppState;
use crate::templates;

/// Query string of GET /view/{filename}.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ViewQuery {
    /// Branch to resolve on; the configured default when absent.
    branch: Option<String>,
}

/// Handle GET /view/{filename}.
pub(crate) async fn get_remote_page(
    Path(filename): Path<String>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let page = with_site(&state, move |site| {
        site.render_remote(&filename, query.branch.as_deref())
    })
    .await?;
    log_warnings(&state, &page);

    let mut extra = vec![(header::CACHE_CONTROL, "private, max-age=60".to_owned())];
    if let PageSource::Remote {
        last_modified: Some(last_modified),
        ..
    } = &page.source
    {
        extra.push((header::LAST_MODIFIED, last_modified.clone()));
    }

    let html = templates::document_page(&page, false);
    Ok(html_response(&state, &headers, html, &extra))
}
