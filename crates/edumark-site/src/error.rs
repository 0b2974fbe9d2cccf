use edumark_remote::RemoteError;

/// Error returned when a document cannot be served.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Filename or branch is malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Document does not exist (after any self-heal).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote documents were requested but no remote repository is configured.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Remote host could not be reached.
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// Remote call exceeded its timeout.
    #[error("Remote timed out after {secs}s")]
    RemoteTimeout {
        /// Configured timeout in seconds.
        secs: u64,
    },

    /// Remote refused the request (including rejected credentials).
    #[error("Remote rejected request (HTTP {status}): {message}")]
    RemoteRejected {
        /// HTTP status code.
        status: u16,
        /// Short diagnostic.
        message: String,
    },

    /// Remote answered with something that could not be interpreted.
    #[error("Malformed remote response: {0}")]
    MalformedResponse(String),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RemoteError> for DocumentError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Unavailable(message) => Self::RemoteUnavailable(message),
            RemoteError::Timeout { secs } => Self::RemoteTimeout { secs },
            RemoteError::Unauthorized { status } => Self::RemoteRejected {
                status,
                message: "credentials rejected".to_owned(),
            },
            RemoteError::NotFound { path } => Self::NotFound(path),
            RemoteError::Rejected { status, message } => Self::RemoteRejected { status, message },
            RemoteError::Malformed(message) => Self::MalformedResponse(message),
        }
    }
}
