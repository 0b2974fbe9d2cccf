//! Landing page.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use edumark_site::Site;

use crate::error::ServerError;
use crate::handlers::with_site;
use crate::state::AppState;
use crate::templates;

/// Handle GET /.
pub(crate) async fn get_home(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ServerError> {
    let files = with_site(&state, Site::local_documents).await?;
    Ok(Html(templates::landing_page(&files)))
}
