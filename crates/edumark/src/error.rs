//! CLI error types.

use edumark_config::ConfigError;
use edumark_site::DocumentError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Server(String),
}
