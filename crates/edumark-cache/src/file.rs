//! File-based cache implementation.
//!
//! [`FileCache`] keeps one file per entry inside a bucket directory. Each file
//! is a small binary header followed by the payload:
//!
//! ```text
//! [etag_len: u32 LE][etag bytes][data bytes]
//! ```
//!
//! Entries are written to a temporary file in the bucket directory and renamed
//! into place, so a crash or a concurrent reader never sees a torn entry.
//!
//! The cache root carries a `VERSION` file. A missing or different version
//! wipes the whole root on construction; this is the only migration path for
//! entry formats.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Cache, CacheBucket};

/// File-based [`Cache`] rooted at a directory on disk.
///
/// ```text
/// {root}/
/// +-- VERSION            # cache format version
/// +-- trees/             # bucket "trees"
///     +-- main.json      # one entry per branch
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open a cache at `root`, wiping it if its `VERSION` differs from
    /// `version`. Errors during validation are logged, never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }

    /// Root directory of this cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

/// A single bucket backed by a directory on disk.
struct FileCacheBucket {
    dir: PathBuf,
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let mut file = File::open(self.dir.join(key)).ok()?;

        let mut len_buf = [0u8; 4];
        file.read_exact(&mut len_buf).ok()?;
        let etag_len = u32::from_le_bytes(len_buf) as usize;

        let mut stored_etag = vec![0u8; etag_len];
        file.read_exact(&mut stored_etag).ok()?;

        if !etag.is_empty() && stored_etag != etag.as_bytes() {
            return None;
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data).ok()?;
        Some(data)
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        let path = self.dir.join(key);
        if let Err(e) = write_atomic(&path, etag, value) {
            tracing::warn!(path = %path.display(), "failed to write cache entry: {e}");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.dir.join(key);
        match fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed cache entry"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), "failed to remove cache entry: {e}"),
        }
    }
}

/// Write an entry through a temp file in the target directory, then rename.
fn write_atomic(path: &Path, etag: &str, value: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("cache entry has no parent directory"))?;
    fs::create_dir_all(parent)?;

    let etag_bytes = etag.as_bytes();
    let etag_len = u32::try_from(etag_bytes.len())
        .map_err(|_| std::io::Error::other("etag too long"))?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(&etag_len.to_le_bytes())?;
    tmp.write_all(etag_bytes)?;
    tmp.write_all(value)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Validate the cache version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
    }
}
