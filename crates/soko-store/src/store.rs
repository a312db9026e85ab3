//! Blob store operations trait.
//!
//! This trait defines the minimal object-store surface soko needs, in a
//! way that maps one-to-one onto cloud stores (GCS, S3): flat keys, whole
//! or prefix-scoped operations, no handles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::StoreResult;

/// Result of a prefix listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    /// Keys under the prefix, in lexicographic order.
    ///
    /// When a delimiter was supplied, only keys with no delimiter past the
    /// prefix appear here; deeper keys are folded into `prefixes`.
    pub keys: Vec<String>,
    /// One-level synthetic sub-prefixes, each ending in the delimiter.
    ///
    /// Empty when no delimiter was supplied.
    pub prefixes: Vec<String>,
}

/// Core blob store operations trait.
///
/// All operations are keyed by flat strings. The store enforces key
/// uniqueness; callers above this boundary synthesize hierarchy from
/// slash-separated key names.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch a blob's bytes.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError::NotFound)
    /// when the key is absent.
    async fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Store a blob, overwriting any existing content under the key.
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StoreResult<()>;

    /// Delete a blob.
    ///
    /// Fails with NotFound when the key is absent.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Delete a batch of blobs, ignoring keys that are already absent.
    async fn delete_many(&self, keys: &[String]) -> StoreResult<()> {
        for key in keys {
            match self.delete(key).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// List keys beginning with `prefix`, in lexicographic order.
    ///
    /// With a delimiter, keys containing the delimiter past the prefix are
    /// truncated at the first delimiter and reported once each in
    /// [`Listing::prefixes`], yielding one-level "directories".
    async fn list(&self, prefix: &str, delimiter: Option<char>) -> StoreResult<Listing>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_ok()
    }
}
