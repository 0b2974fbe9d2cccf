//! Filename resolution against a persisted per-branch index.
//!
//! A branch index is built by one tree scan, persisted in the `trees` cache
//! bucket and kept in memory. Lookups use it without remote calls until it
//! proves stale:
//!
//! - the filename is missing from the index, or
//! - the content fetch for the indexed path returns 404.
//!
//! Either case discards the index, rebuilds it and retries once. Each request
//! gets one such heal, so a request costs at most two scans and two fetches.
//! Building an index for a branch never seen before does not count as a heal.
//!
//! Rebuilds of one branch are serialized behind a gate holding a generation
//! counter. A request that finds the generation moved since it read its index
//! reuses the index another request just built instead of scanning again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use edumark_cache::{Cache, CacheBucket, CacheBucketExt};
use edumark_remote::{BranchIndex, FetchResult, RemoteContent, RemoteError, RemoteTree};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, info, warn};

use crate::DocumentError;

/// Cache bucket holding one entry per branch.
const BUCKET: &str = "trees";

/// Persisted form of a [`BranchIndex`].
type Pairs = Vec<(String, Vec<String>)>;

/// Where a filename lives on a branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Requested bare filename.
    pub filename: String,
    /// Branch the index describes.
    pub branch: String,
    /// Chosen full path (the first discovered).
    pub path: String,
    /// Every known path for the filename, in discovery order.
    pub candidates: Vec<String>,
}

/// A resolved and fetched remote document.
#[derive(Clone, Debug)]
pub struct ResolvedDocument {
    /// Resolution that produced the fetched path.
    pub resolution: Resolution,
    /// Fetched text and metadata.
    pub document: FetchResult,
    /// Whether a stale index had to be rebuilt to serve this request.
    pub healed: bool,
}

/// Resolves bare filenames to remote documents.
pub struct Resolver {
    tree: Arc<dyn RemoteTree>,
    content: Arc<dyn RemoteContent>,
    bucket: Box<dyn CacheBucket>,
    loaded: RwLock<HashMap<String, Arc<BranchIndex>>>,
    gates: Mutex<HashMap<String, Arc<Mutex<u64>>>>,
}

impl Resolver {
    /// Create a resolver persisting indexes in `cache`.
    pub fn new(
        tree: Arc<dyn RemoteTree>,
        content: Arc<dyn RemoteContent>,
        cache: &dyn Cache,
    ) -> Self {
        Self {
            tree,
            content,
            bucket: cache.bucket(BUCKET),
            loaded: RwLock::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `filename` on `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if the filename is absent even after
    /// one rebuild, or the classified remote error if a scan fails.
    pub fn resolve(&self, filename: &str, branch: &str) -> Result<Resolution, DocumentError> {
        let mut heal_available = true;
        self.resolve_within(filename, branch, &mut heal_available)
            .map(|(resolution, _)| resolution)
    }

    /// Resolve `filename` on `branch` and fetch its text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if the document cannot be found
    /// after one heal, or the classified remote error for any other failure.
    pub fn fetch(&self, filename: &str, branch: &str) -> Result<ResolvedDocument, DocumentError> {
        let mut heal_available = true;
        let (resolution, seen) = self.resolve_within(filename, branch, &mut heal_available)?;

        match self.content.fetch(&resolution.path, branch) {
            Ok(document) => Ok(ResolvedDocument {
                resolution,
                document,
                healed: !heal_available,
            }),
            Err(err) if err.is_not_found() && heal_available => {
                warn!(
                    filename,
                    branch,
                    path = %resolution.path,
                    "Indexed path is gone upstream, rebuilding branch index"
                );
                let (index, _) = self.rebuild(branch, seen)?;
                let resolution =
                    lookup(&index, filename).ok_or_else(|| not_found(filename, branch))?;
                let document = self
                    .content
                    .fetch(&resolution.path, branch)
                    .map_err(|err| fetch_error(err, filename, branch))?;
                Ok(ResolvedDocument {
                    resolution,
                    document,
                    healed: true,
                })
            }
            Err(err) => Err(fetch_error(err, filename, branch)),
        }
    }

    /// Drop the index of `branch` from memory and from the cache.
    pub fn invalidate(&self, branch: &str) {
        let gate = self.gate(branch);
        let _generation = lock(&gate);
        self.discard(branch);
        info!(branch, "Invalidated branch index");
    }

    /// Rebuild the index of `branch` unconditionally.
    ///
    /// # Errors
    ///
    /// Returns the classified remote error if the scan fails. The previous
    /// index is gone in that case.
    pub fn refresh(&self, branch: &str) -> Result<Arc<BranchIndex>, DocumentError> {
        let gate = self.gate(branch);
        let mut generation = lock(&gate);
        self.discard(branch);
        let index = self.scan(branch)?;
        *generation += 1;
        Ok(index)
    }

    /// Index of `branch` if one is loaded or persisted. Never scans.
    pub fn cached_index(&self, branch: &str) -> Option<Arc<BranchIndex>> {
        self.load(branch)
    }

    fn resolve_within(
        &self,
        filename: &str,
        branch: &str,
        heal_available: &mut bool,
    ) -> Result<(Resolution, u64), DocumentError> {
        let (index, seen) = self.index(branch)?;
        if let Some(resolution) = lookup(&index, filename) {
            return Ok((resolution, seen));
        }
        if !*heal_available {
            return Err(not_found(filename, branch));
        }

        *heal_available = false;
        warn!(filename, branch, "Filename not in branch index, rebuilding");
        let (index, seen) = self.rebuild(branch, seen)?;
        lookup(&index, filename)
            .map(|resolution| (resolution, seen))
            .ok_or_else(|| not_found(filename, branch))
    }

    /// Current index of `branch`, building it on first use.
    ///
    /// Returns the index with the generation observed before reading it.
    fn index(&self, branch: &str) -> Result<(Arc<BranchIndex>, u64), DocumentError> {
        let gate = self.gate(branch);
        let seen = *lock(&gate);
        if let Some(index) = self.load(branch) {
            return Ok((index, seen));
        }

        let mut generation = lock(&gate);
        if let Some(index) = self.load(branch) {
            debug!(branch, "Branch index built by a concurrent request");
            return Ok((index, *generation));
        }

        let index = self.scan(branch)?;
        *generation += 1;
        Ok((index, *generation))
    }

    /// Replace a stale index, unless another request already did since `seen`.
    fn rebuild(&self, branch: &str, seen: u64) -> Result<(Arc<BranchIndex>, u64), DocumentError> {
        let gate = self.gate(branch);
        let mut generation = lock(&gate);

        if *generation != seen
            && let Some(index) = self.load(branch)
        {
            debug!(branch, "Reusing branch index rebuilt by a concurrent request");
            return Ok((index, *generation));
        }

        self.discard(branch);
        let index = self.scan(branch)?;
        *generation += 1;
        Ok((index, *generation))
    }

    fn scan(&self, branch: &str) -> Result<Arc<BranchIndex>, DocumentError> {
        let index = self.tree.scan(branch)?;
        info!(
            branch,
            files = index.len(),
            ambiguous = index.ambiguous().count(),
            "Built branch index"
        );

        self.bucket.set_json(&cache_key(branch), "", &index.to_pairs());
        let index = Arc::new(index);
        self.loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(branch.to_owned(), Arc::clone(&index));
        Ok(index)
    }

    fn load(&self, branch: &str) -> Option<Arc<BranchIndex>> {
        if let Some(index) = self
            .loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(branch)
        {
            return Some(Arc::clone(index));
        }

        let Some(pairs) = self.bucket.get_json::<Pairs>(&cache_key(branch), "") else {
            debug!(branch, "Branch index cache miss");
            return None;
        };
        debug!(branch, "Branch index cache hit");

        let index = Arc::new(BranchIndex::from_pairs(branch, pairs));
        self.loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(branch.to_owned(), Arc::clone(&index));
        Some(index)
    }

    fn discard(&self, branch: &str) {
        self.loaded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(branch);
        self.bucket.remove(&cache_key(branch));
    }

    fn gate(&self, branch: &str) -> Arc<Mutex<u64>> {
        Arc::clone(lock(&self.gates).entry(branch.to_owned()).or_default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cache key of a branch: percent-encoded name plus `.json`.
fn cache_key(branch: &str) -> String {
    format!("{}.json", utf8_percent_encode(branch, NON_ALPHANUMERIC))
}

fn lookup(index: &BranchIndex, filename: &str) -> Option<Resolution> {
    let candidates = index.candidates(filename)?;
    let path = candidates.first()?.clone();
    if candidates.len() > 1 {
        debug!(
            filename,
            branch = index.branch(),
            candidates = candidates.len(),
            path = %path,
            "Ambiguous filename, using first path"
        );
    }
    Some(Resolution {
        filename: filename.to_owned(),
        branch: index.branch().to_owned(),
        path,
        candidates: candidates.to_vec(),
    })
}

fn not_found(filename: &str, branch: &str) -> DocumentError {
    DocumentError::NotFound(format!("{filename} on branch {branch}"))
}

fn fetch_error(err: RemoteError, filename: &str, branch: &str) -> DocumentError {
    if err.is_not_found() {
        not_found(filename, branch)
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use edumark_cache::{FileCache, NullCache};
    use edumark_remote::MockRemote;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn resolver(remote: &Arc<MockRemote>, cache: &dyn Cache) -> Resolver {
        Resolver::new(remote.clone(), remote.clone(), cache)
    }

    fn course() -> MockRemote {
        MockRemote::new()
            .with_file("main", "week1/intro.md", "# Intro")
            .with_file("main", "week1/setup.md", "# Setup")
            .with_file("main", "week2/sorting.md", "# Sorting")
    }

    #[test]
    fn test_cold_branch_scans_once() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(course());
        let resolver = resolver(&remote, &cache);

        let first = resolver.resolve("intro.md", "main").unwrap();
        assert_eq!(first.path, "week1/intro.md");
        assert_eq!(remote.scan_count(), 1);

        let second = resolver.resolve("sorting.md", "main").unwrap();
        assert_eq!(second.path, "week2/sorting.md");
        assert_eq!(remote.scan_count(), 1);
    }

    #[test]
    fn test_absent_filename_from_cold_scans_twice() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(course());
        let resolver = resolver(&remote, &cache);

        let err = resolver.resolve("missing.md", "main").unwrap_err();

        assert!(matches!(err, DocumentError::NotFound(_)));
        assert_eq!(remote.scan_count(), 2);
    }

    #[test]
    fn test_new_file_upstream_is_found_by_one_rebuild() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(course());
        let resolver = resolver(&remote, &cache);
        resolver.resolve("intro.md", "main").unwrap();

        remote.add_file("main", "week3/graphs.md", "# Graphs");
        let doc = resolver.fetch("graphs.md", "main").unwrap();

        assert_eq!(doc.document.text, "# Graphs");
        assert!(doc.healed);
        assert_eq!(remote.scan_count(), 2);
    }

    #[test]
    fn test_moved_file_heals_with_one_rescan_and_one_refetch() {
        let tmp = TempDir::new().unwrap();
        let remote = Arc::new(course());
        {
            let cache = FileCache::new(tmp.path().to_path_buf(), "test");
            resolver(&remote, &cache).resolve("intro.md", "main").unwrap();
        }
        remote.move_file("main", "week1/intro.md", "archive/intro.md");

        // Fresh resolver: index comes from disk and is stale
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let resolver = resolver(&remote, &cache);
        let scans = remote.scan_count();
        let fetches = remote.fetch_count();

        let doc = resolver.fetch("intro.md", "main").unwrap();

        assert_eq!(doc.resolution.path, "archive/intro.md");
        assert_eq!(doc.document.text, "# Intro");
        assert!(doc.healed);
        assert_eq!(remote.scan_count() - scans, 1);
        assert_eq!(remote.fetch_count() - fetches, 2);
    }

    #[test]
    fn test_deleted_file_is_not_found_after_one_heal() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(course());
        let resolver = resolver(&remote, &cache);
        resolver.resolve("setup.md", "main").unwrap();

        remote.remove_file("main", "week1/setup.md");
        let err = resolver.fetch("setup.md", "main").unwrap_err();

        assert!(matches!(err, DocumentError::NotFound(_)));
        assert_eq!(remote.scan_count(), 2);
        assert_eq!(remote.fetch_count(), 1);
    }

    #[test]
    fn test_persistent_fetch_404_never_loops() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(course());
        remote.fail_fetches(Some(RemoteError::NotFound {
            path: "week1/intro.md".to_owned(),
        }));
        let resolver = resolver(&remote, &cache);

        let err = resolver.fetch("intro.md", "main").unwrap_err();

        assert!(matches!(err, DocumentError::NotFound(_)));
        assert_eq!(remote.scan_count(), 2);
        assert_eq!(remote.fetch_count(), 2);
    }

    #[test]
    fn test_lookup_heal_consumes_the_budget() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(course());
        let resolver = resolver(&remote, &cache);
        resolver.resolve("intro.md", "main").unwrap();

        remote.add_file("main", "week4/trees.md", "# Trees");
        remote.fail_fetches(Some(RemoteError::NotFound {
            path: "week4/trees.md".to_owned(),
        }));
        let err = resolver.fetch("trees.md", "main").unwrap_err();

        assert!(matches!(err, DocumentError::NotFound(_)));
        assert_eq!(remote.scan_count(), 2);
        assert_eq!(remote.fetch_count(), 1);
    }

    #[test]
    fn test_persisted_index_reloads_identically() {
        let tmp = TempDir::new().unwrap();
        let remote = Arc::new(
            MockRemote::new()
                .with_file("main", "z/b.md", "")
                .with_file("main", "a/a.md", "")
                .with_file("main", "y/b.md", "")
                .with_file("main", "c.md", ""),
        );

        let original = {
            let cache = FileCache::new(tmp.path().to_path_buf(), "test");
            let resolver = resolver(&remote, &cache);
            resolver.resolve("c.md", "main").unwrap();
            resolver.cached_index("main").unwrap()
        };

        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let reloaded = resolver(&remote, &cache).cached_index("main").unwrap();

        assert_eq!(reloaded.to_pairs(), original.to_pairs());
        assert_eq!(remote.scan_count(), 1);
    }

    #[test]
    fn test_duplicate_basename_first_path_wins() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(
            MockRemote::new()
                .with_file("main", "week2/notes.md", "two")
                .with_file("main", "week1/notes.md", "one"),
        );
        let resolver = resolver(&remote, &cache);

        for _ in 0..3 {
            let resolution = resolver.resolve("notes.md", "main").unwrap();
            assert_eq!(resolution.path, "week2/notes.md");
            assert_eq!(resolution.candidates.len(), 2);
        }
        assert_eq!(resolver.fetch("notes.md", "main").unwrap().document.text, "two");
    }

    #[test]
    fn test_remote_errors_propagate_without_heal() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(course());
        remote.fail_scans(Some(RemoteError::Timeout { secs: 15 }));
        let resolver = resolver(&remote, &cache);

        let err = resolver.resolve("intro.md", "main").unwrap_err();

        assert!(matches!(err, DocumentError::RemoteTimeout { secs: 15 }));
        assert_eq!(remote.scan_count(), 1);
    }

    #[test]
    fn test_unauthorized_fetch_is_not_retried() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(course());
        remote.fail_fetches(Some(RemoteError::Unauthorized { status: 401 }));
        let resolver = resolver(&remote, &cache);

        let err = resolver.fetch("intro.md", "main").unwrap_err();

        assert!(matches!(err, DocumentError::RemoteRejected { status: 401, .. }));
        assert_eq!(remote.scan_count(), 1);
        assert_eq!(remote.fetch_count(), 1);
    }

    #[test]
    fn test_unknown_branch_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(course());
        let resolver = resolver(&remote, &cache);

        let err = resolver.resolve("intro.md", "nope").unwrap_err();
        assert!(matches!(err, DocumentError::RemoteRejected { status: 404, .. }));
    }

    #[test]
    fn test_invalidate_and_refresh() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(course());
        let resolver = resolver(&remote, &cache);
        resolver.resolve("intro.md", "main").unwrap();

        resolver.invalidate("main");
        assert!(resolver.cached_index("main").is_none());
        assert!(!tmp.path().join("trees/main.json").exists());

        let index = resolver.refresh("main").unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(remote.scan_count(), 2);
        assert!(tmp.path().join("trees/main.json").exists());
    }

    #[test]
    fn test_branch_keys_are_percent_encoded() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        let remote = Arc::new(MockRemote::new().with_file("feature/week-2", "a.md", "A"));
        let resolver = resolver(&remote, &cache);

        resolver.resolve("a.md", "feature/week-2").unwrap();

        assert!(tmp.path().join("trees/feature%2Fweek%2D2.json").exists());
        assert!(resolver.cached_index("main").is_none());
    }

    #[test]
    fn test_corrupt_cache_entry_is_rebuilt() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().to_path_buf(), "test");
        cache.bucket(BUCKET).set("main.json", "", b"{broken");
        let remote = Arc::new(course());
        let resolver = resolver(&remote, &cache);

        assert_eq!(resolver.resolve("intro.md", "main").unwrap().path, "week1/intro.md");
        assert_eq!(remote.scan_count(), 1);
    }

    #[test]
    fn test_disabled_cache_still_keeps_index_in_memory() {
        let remote = Arc::new(course());
        let resolver = resolver(&remote, &NullCache);

        resolver.resolve("intro.md", "main").unwrap();
        resolver.resolve("setup.md", "main").unwrap();

        assert_eq!(remote.scan_count(), 1);
    }

    #[test]
    fn test_concurrent_cold_start_scans_once() {
        let remote = Arc::new(course().with_scan_delay(Duration::from_millis(50)));
        let resolver = Arc::new(resolver(&remote, &NullCache));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || resolver.resolve("sorting.md", "main").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().path, "week2/sorting.md");
        }

        assert_eq!(remote.scan_count(), 1);
    }

    #[test]
    fn test_concurrent_stale_fetches_rebuild_once() {
        let remote = Arc::new(course());
        let resolver = Arc::new(resolver(&remote, &NullCache));
        resolver.resolve("intro.md", "main").unwrap();
        remote.move_file("main", "week1/intro.md", "archive/intro.md");

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || resolver.fetch("intro.md", "main").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().resolution.path, "archive/intro.md");
        }

        assert_eq!(remote.scan_count(), 2);
    }
}
