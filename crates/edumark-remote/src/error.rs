/// Classified failure of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Network failure: DNS, connect, TLS, reset.
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// The call exceeded its deadline.
    #[error("remote timed out after {secs}s")]
    Timeout {
        /// Configured timeout in seconds.
        secs: u64,
    },

    /// Credentials were rejected (401/403).
    #[error("remote rejected credentials (HTTP {status})")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
    },

    /// The path does not exist on the branch.
    #[error("not found on remote: {path}")]
    NotFound {
        /// Full repository path that was requested.
        path: String,
    },

    /// Any other non-success status.
    #[error("remote returned HTTP {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Short diagnostic from the response body.
        message: String,
    },

    /// The response could not be interpreted.
    #[error("malformed remote response: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// Whether this error means the requested path is absent, i.e. an index
    /// pointing at it may be stale.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
