//! Extension trait for [`CacheBucket`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// JSON access on top of any [`CacheBucket`].
///
/// Kept off [`CacheBucket`] itself so the base trait stays object-safe and
/// implementors only handle bytes.
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a JSON-deserialized value.
    ///
    /// Returns `None` on miss, etag mismatch, or a payload that no longer
    /// deserializes (treated the same as a miss).
    fn get_json<T: DeserializeOwned>(&self, key: &str, etag: &str) -> Option<T> {
        let bytes = self.get(key, etag)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, "discarding unreadable cache entry: {e}");
                None
            }
        }
    }

    /// Store a value as JSON. Serialization failures are logged and dropped.
    fn set_json<T: Serialize>(&self, key: &str, etag: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, etag, &bytes),
            Err(e) => tracing::warn!(key, "failed to serialize cache entry: {e}"),
        }
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct MemoryBucket {
        entries: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl CacheBucket for MemoryBucket {
        fn get(&self, key: &str, _etag: &str) -> Option<Vec<u8>> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn set(&self, key: &str, _etag: &str, value: &[u8]) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_owned(), value.to_vec());
        }

        fn remove(&self, key: &str) {
            self.entries.lock().unwrap().remove(key);
        }
    }

    #[test]
    fn test_json_keeps_pair_order() {
        let bucket = MemoryBucket::default();
        let pairs = vec![
            ("b.md".to_owned(), vec!["x/b.md".to_owned()]),
            ("a.md".to_owned(), vec!["y/a.md".to_owned(), "a.md".to_owned()]),
        ];

        bucket.set_json("main.json", "", &pairs);
        let loaded: Option<Vec<(String, Vec<String>)>> = bucket.get_json("main.json", "");

        assert_eq!(loaded, Some(pairs));
    }

    #[test]
    fn test_corrupt_json_is_a_miss() {
        let bucket = MemoryBucket::default();
        bucket.set("main.json", "", b"{not json");

        let loaded: Option<Vec<(String, Vec<String>)>> = bucket.get_json("main.json", "");
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_works_through_trait_object() {
        let bucket: Box<dyn CacheBucket> = Box::new(MemoryBucket::default());
        bucket.set_json("k", "", &vec![1, 2, 3]);
        assert_eq!(bucket.get_json::<Vec<i32>>("k", ""), Some(vec![1, 2, 3]));
    }
}
