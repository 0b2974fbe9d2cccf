//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use edumark_site::DocumentError;

use crate::templates;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Document could not be served.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Blocking task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    /// HTTP status for this error.
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::Document(err) => match err {
                DocumentError::BadRequest(_) => StatusCode::BAD_REQUEST,
                DocumentError::NotFound(_) => StatusCode::NOT_FOUND,
                DocumentError::ConfigurationMissing(_) | DocumentError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                DocumentError::RemoteUnavailable(_)
                | DocumentError::RemoteRejected { .. }
                | DocumentError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
                DocumentError::RemoteTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            },
            Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = templates::error_page(status, &self.to_string());
        (status, Html(body)).into_response()
    }
}
