//! Persistent cache buckets for EduMark.
//!
//! Cache consumers talk to two small traits and never to the filesystem
//! directly:
//!
//! - [`Cache`]: factory for named buckets
//! - [`CacheBucket`]: key-value store with etag validation and removal
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: caching disabled (always miss)
//! - [`FileCache`]: one file per entry, atomic writes, versioned root
//!
//! Typed access (JSON) lives on the [`CacheBucketExt`] extension trait.
//!
//! # Example
//!
//! ```
//! use edumark_cache::{Cache, NullCache};
//!
//! let cache = NullCache;
//! let bucket = cache.bucket("trees");
//! bucket.set("main.json", "", b"[]");
//! assert_eq!(bucket.get("main.json", ""), None); // NullCache always misses
//! ```

mod ext;
mod file;

pub use ext::CacheBucketExt;
pub use file::FileCache;

/// A named partition within a [`Cache`].
///
/// Values are stored together with an etag chosen by the caller. A hit requires
/// the key to exist and, unless the requested etag is empty, the stored etag to
/// match.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `None` on miss or etag mismatch. An empty `etag` skips
    /// validation.
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>>;

    /// Store a value, replacing any previous entry for `key`.
    ///
    /// Readers never observe a partially written value.
    fn set(&self, key: &str, etag: &str, value: &[u8]);

    /// Delete the entry for `key`. Missing entries are not an error.
    fn remove(&self, key: &str);
}

/// Factory for named [`CacheBucket`]s.
///
/// Buckets with different names never share entries.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket (e.g. "trees").
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`].
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _etag: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &[u8]) {}

    fn remove(&self, _key: &str) {}
}

/// No-op [`Cache`] used when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
