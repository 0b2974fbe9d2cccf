//! Remote repository contracts for EduMark.
//!
//! A remote repository is reached through two capabilities:
//!
//! - [`RemoteTree`]: one bulk listing of a branch, turned into a [`BranchIndex`]
//! - [`RemoteContent`]: raw text of a single file at a full path
//!
//! Both are blocking and bounded by timeouts in the implementation. Failures
//! are classified by [`RemoteError`] so callers can tell a stale index
//! ([`RemoteError::NotFound`]) from an outage.
//!
//! [`MockRemote`] (behind the `mock` feature) implements both traits in memory
//! with call counters for tests.

mod error;
mod index;
#[cfg(feature = "mock")]
mod mock;

pub use error::RemoteError;
pub use index::{BranchIndex, basename};
#[cfg(feature = "mock")]
pub use mock::MockRemote;

/// Raw document fetched from the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Document text.
    pub text: String,
    /// `Last-Modified` value as sent by the remote, if any.
    pub last_modified: Option<String>,
    /// Full repository path the text was fetched from.
    pub path: String,
}

/// Bulk listing of a branch.
pub trait RemoteTree: Send + Sync {
    /// List every file of `branch` and index it by bare filename.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the listing cannot be obtained or parsed.
    fn scan(&self, branch: &str) -> Result<BranchIndex, RemoteError>;
}

/// Single-file retrieval.
pub trait RemoteContent: Send + Sync {
    /// Fetch the raw text at `path` on `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::NotFound`] if the path does not exist on the
    /// branch, other variants for transport and authorization failures.
    fn fetch(&self, path: &str, branch: &str) -> Result<FetchResult, RemoteError>;
}
