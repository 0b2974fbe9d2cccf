//! In-memory remote for testing.
//!
//! Provides [`MockRemote`] for exercising resolution logic without network
//! access.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::{BranchIndex, FetchResult, RemoteContent, RemoteError, RemoteTree};

/// Mock remote repository.
///
/// Holds one file tree per branch plus file contents. The tree and the
/// contents are independent, so a test can make the listing disagree with the
/// files (a moved or deleted file upstream). Every call is counted.
///
/// # Example
///
/// ```ignore
/// use edumark_remote::{MockRemote, RemoteContent, RemoteTree};
///
/// let remote = MockRemote::new()
///     .with_file("main", "week1/intro.md", "# Intro");
///
/// let index = remote.scan("main")?;
/// let doc = remote.fetch(index.lookup("intro.md").unwrap(), "main")?;
/// assert_eq!(remote.scan_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockRemote {
    trees: RwLock<HashMap<String, Vec<String>>>,
    contents: RwLock<HashMap<(String, String), String>>,
    scan_error: RwLock<Option<RemoteError>>,
    fetch_error: RwLock<Option<RemoteError>>,
    scan_delay: RwLock<Option<Duration>>,
    scans: AtomicUsize,
    fetches: AtomicUsize,
}

impl MockRemote {
    /// Create an empty mock remote (no branches).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to both the branch listing and the contents.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, branch: &str, path: &str, text: &str) -> Self {
        self.add_file(branch, path, text);
        self
    }

    /// Declare a branch with an empty listing.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_branch(self, branch: &str) -> Self {
        self.trees
            .write()
            .unwrap()
            .entry(branch.to_owned())
            .or_default();
        self
    }

    /// Sleep this long inside every scan.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_scan_delay(self, delay: Duration) -> Self {
        *self.scan_delay.write().unwrap() = Some(delay);
        self
    }

    /// Add a file to the listing and contents of `branch`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn add_file(&self, branch: &str, path: &str, text: &str) {
        self.trees
            .write()
            .unwrap()
            .entry(branch.to_owned())
            .or_default()
            .push(path.to_owned());
        self.contents
            .write()
            .unwrap()
            .insert((branch.to_owned(), path.to_owned()), text.to_owned());
    }

    /// Remove a file from both listing and contents, as if deleted upstream.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove_file(&self, branch: &str, path: &str) {
        if let Some(paths) = self.trees.write().unwrap().get_mut(branch) {
            paths.retain(|p| p != path);
        }
        self.contents
            .write()
            .unwrap()
            .remove(&(branch.to_owned(), path.to_owned()));
    }

    /// Move a file upstream: remove `from`, add `to` with the same text.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn move_file(&self, branch: &str, from: &str, to: &str) {
        let text = self
            .contents
            .read()
            .unwrap()
            .get(&(branch.to_owned(), from.to_owned()))
            .cloned()
            .unwrap_or_default();
        self.remove_file(branch, from);
        self.add_file(branch, to, &text);
    }

    /// Make every following scan fail with `error` (`None` clears it).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_scans(&self, error: Option<RemoteError>) {
        *self.scan_error.write().unwrap() = error;
    }

    /// Make every following fetch fail with `error` (`None` clears it).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_fetches(&self, error: Option<RemoteError>) {
        *self.fetch_error.write().unwrap() = error;
    }

    /// Number of [`RemoteTree::scan`] calls so far.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Number of [`RemoteContent::fetch`] calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl RemoteTree for MockRemote {
    fn scan(&self, branch: &str) -> Result<BranchIndex, RemoteError> {
        self.scans.fetch_add(1, Ordering::SeqCst);

        let delay = *self.scan_delay.read().unwrap();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        if let Some(err) = self.scan_error.read().unwrap().clone() {
            return Err(err);
        }

        let trees = self.trees.read().unwrap();
        let paths = trees.get(branch).ok_or_else(|| RemoteError::Rejected {
            status: 404,
            message: "Not Found".to_owned(),
        })?;
        Ok(BranchIndex::from_paths(branch, paths.iter().cloned()))
    }
}

impl RemoteContent for MockRemote {
    fn fetch(&self, path: &str, branch: &str) -> Result<FetchResult, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.fetch_error.read().unwrap().clone() {
            return Err(err);
        }

        self.contents
            .read()
            .unwrap()
            .get(&(branch.to_owned(), path.to_owned()))
            .map(|text| FetchResult {
                text: text.clone(),
                last_modified: None,
                path: path.to_owned(),
            })
            .ok_or_else(|| RemoteError::NotFound {
                path: path.to_owned(),
            })
    }
}
