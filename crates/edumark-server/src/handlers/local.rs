//! Local preview from the source directory.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::{html_response, log_warnings, with_site};
use crate::state::AppState;
use crate::templates;

/// Response for GET /local/{filename}/mtime.
#[derive(Debug, Serialize)]
pub(crate) struct MtimeResponse {
    /// Modification time as Unix seconds.
    mtime: f64,
}

/// Handle GET /local/{filename}.
pub(crate) async fn get_local_page(
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let page = with_site(&state, move |site| site.render_local(&filename)).await?;
    log_warnings(&state, &page);

    let html = templates::document_page(&page, true);
    let extra = [(header::CACHE_CONTROL, "no-cache".to_owned())];
    Ok(html_response(&state, &headers, html, &extra))
}

/// Handle GET /local/{filename}/mtime.
pub(crate) async fn get_local_mtime(
    Path(filename): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MtimeResponse>, ServerError> {
    let mtime = with_site(&state, move |site| site.local_mtime(&filename)).await?;
    Ok(Json(MtimeResponse { mtime }))
}
