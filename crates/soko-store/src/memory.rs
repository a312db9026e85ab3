//! In-memory blob store.
//!
//! Used for testing and local runs. All data is ephemeral.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{BlobStore, Listing};

/// A stored blob: bytes plus the content type given at put time.
#[derive(Debug, Clone)]
struct Blob {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory blob store.
///
/// Thread-safe via internal `RwLock`. Keys live in a `BTreeMap` so listing
/// order matches the lexicographic order real object stores return. All
/// data is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<BTreeMap<String, Blob>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    /// Returns true when no blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content type recorded for a key, if present.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.blobs
            .read()
            .ok()
            .and_then(|b| b.get(key).map(|blob| blob.content_type.clone()))
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StoreError::other("lock poisoned"))?;

        blobs
            .get(key)
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| StoreError::not_found(key))
    }

    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StoreResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| StoreError::other("lock poisoned"))?;

        blobs.insert(
            key.to_string(),
            Blob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| StoreError::other("lock poisoned"))?;

        blobs
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(key))
    }

    async fn list(&self, prefix: &str, delimiter: Option<char>) -> StoreResult<Listing> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StoreError::other("lock poisoned"))?;

        let mut listing = Listing::default();
        for key in blobs
            .range(prefix.to_string()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
        {
            let rest = &key[prefix.len()..];
            match delimiter.and_then(|d| rest.find(d).map(|i| (d, i))) {
                Some((d, idx)) => {
                    let sub = &key[..prefix.len() + idx + d.len_utf8()];
                    // BTreeMap iterates sorted, so duplicates are adjacent
                    if listing.prefixes.last().map(String::as_str) != Some(sub) {
                        listing.prefixes.push(sub.to_string());
                    }
                }
                None => listing.keys.push(key.clone()),
            }
        }
        Ok(listing)
    }

    async fn exists(&self, key: &str) -> bool {
        self.blobs
            .read()
            .map(|b| b.contains_key(key))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryStore::new();
        store
            .put("test.txt", b"hello world", "text/plain")
            .await
            .unwrap();

        let bytes = store.get("test.txt").await.unwrap();
        assert_eq!(bytes, b"hello world");
        assert_eq!(store.content_type("test.txt").as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_get_absent_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("k", b"one", "text/plain").await.unwrap();
        store.put("k", b"two", "text/plain").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), b"two");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store.put("k", b"v", "text/plain").await.unwrap();
        store.delete("k").await.unwrap();
        assert!(!store.exists("k").await);
        assert!(store.delete("k").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_many_ignores_absent() {
        let store = MemoryStore::new();
        store.put("a", b"1", "text/plain").await.unwrap();
        store.put("b", b"2", "text/plain").await.unwrap();

        store
            .delete_many(&["a".into(), "missing".into(), "b".into()])
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_recursive() {
        let store = MemoryStore::new();
        store.put("x/a.txt", b"", "text/plain").await.unwrap();
        store.put("x/sub/b.txt", b"", "text/plain").await.unwrap();
        store.put("y/c.txt", b"", "text/plain").await.unwrap();

        let listing = store.list("x/", None).await.unwrap();
        assert_eq!(listing.keys, vec!["x/a.txt", "x/sub/b.txt"]);
        assert!(listing.prefixes.is_empty());
    }

    #[tokio::test]
    async fn test_list_with_delimiter() {
        let store = MemoryStore::new();
        store.put("x/a.txt", b"", "text/plain").await.unwrap();
        store.put("x/sub/b.txt", b"", "text/plain").await.unwrap();
        store.put("x/sub/c.txt", b"", "text/plain").await.unwrap();

        let listing = store.list("x/", Some('/')).await.unwrap();
        assert_eq!(listing.keys, vec!["x/a.txt"]);
        assert_eq!(listing.prefixes, vec!["x/sub/"]);
    }

    #[tokio::test]
    async fn test_list_includes_marker_blob() {
        let store = MemoryStore::new();
        store.put("dir/", b"", "application/x-directory").await.unwrap();

        let listing = store.list("dir/", Some('/')).await.unwrap();
        assert_eq!(listing.keys, vec!["dir/"]);
    }

    #[tokio::test]
    async fn test_list_empty_prefix_is_everything() {
        let store = MemoryStore::new();
        store.put("a", b"", "text/plain").await.unwrap();
        store.put("b/c", b"", "text/plain").await.unwrap();

        let listing = store.list("", None).await.unwrap();
        assert_eq!(listing.keys, vec!["a", "b/c"]);

        let listing = store.list("", Some('/')).await.unwrap();
        assert_eq!(listing.keys, vec!["a"]);
        assert_eq!(listing.prefixes, vec!["b/"]);
    }
}
