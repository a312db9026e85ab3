//! The workspace facade.
//!
//! One method per operation a caller exposes to the agent. Every method
//! normalizes its path argument exactly once, joins it under the configured
//! confinement prefix, and delegates to the engine that owns the semantics.

use std::sync::Arc;

use soko_store::BlobStore;

use crate::config::WorkspaceConfig;
use crate::dir::DirectoryView;
use crate::edit::PatchEngine;
use crate::error::{WorkspaceResult, map_read_err};
use crate::path::{blob_key, dir_prefix, normalize};
use crate::read::ContentReader;
use crate::search::{LineMatch, SearchEngine};

const DIRECTORY_CONTENT_TYPE: &str = "application/x-directory";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A pseudo-filesystem over a blob store.
///
/// Stateless: every call is an independent transaction against the store,
/// and nothing is cached between calls. Concurrent calls against the same
/// path are not coordinated; the last whole-file write wins.
pub struct Workspace {
    store: Arc<dyn BlobStore>,
    config: WorkspaceConfig,
    /// Normalized directory form of `config.root_prefix`.
    root: String,
    dir: DirectoryView,
    reader: ContentReader,
    patch: PatchEngine,
    search: SearchEngine,
}

impl Workspace {
    /// A workspace over the whole store, with default limits.
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_config(store, WorkspaceConfig::default())
    }

    /// A workspace confined and limited by `config`.
    pub fn with_config(store: Arc<dyn BlobStore>, config: WorkspaceConfig) -> Self {
        let root = config.normalized_root();
        Self {
            dir: DirectoryView::new(store.clone()),
            reader: ContentReader::new(store.clone()),
            patch: PatchEngine::new(store.clone()),
            search: SearchEngine::new(
                store.clone(),
                config.max_grep_file_bytes,
                config.max_grep_matches,
            ),
            store,
            root,
            config,
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Normalize a caller path and join it under the confinement prefix.
    ///
    /// Normalization clamps `..` at its root first, so no input can climb
    /// out of the prefix.
    fn resolve(&self, raw: &str) -> String {
        let path = normalize(raw);
        if self.root.is_empty() {
            path
        } else if path.is_empty() {
            self.root.clone()
        } else {
            format!("{}{}", self.root, path)
        }
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Read a file as text, optionally sliced by 1-based line range or
    /// PDF page. See [`ContentReader::read`].
    #[tracing::instrument(skip(self), name = "workspace.read")]
    pub async fn read_file(
        &self,
        path: &str,
        start_line: Option<i64>,
        end_line: Option<i64>,
        page: Option<u32>,
    ) -> WorkspaceResult<String> {
        self.reader
            .read(&self.resolve(path), start_line, end_line, page)
            .await
    }

    /// Read raw bytes, optionally sliced with Python-style bounds.
    #[tracing::instrument(skip(self), name = "workspace.read_bytes")]
    pub async fn read_bytes(
        &self,
        path: &str,
        start: Option<i64>,
        end: Option<i64>,
    ) -> WorkspaceResult<Vec<u8>> {
        self.reader.read_bytes(&self.resolve(path), start, end).await
    }

    /// List a directory's immediate children, sorted ascending.
    #[tracing::instrument(skip(self), name = "workspace.list")]
    pub async fn list_directory(&self, path: &str) -> WorkspaceResult<Vec<String>> {
        self.dir.list(&self.resolve(path)).await
    }

    /// Render the subtree under a path as an ASCII tree.
    #[tracing::instrument(skip(self), name = "workspace.tree")]
    pub async fn tree(&self, path: &str) -> WorkspaceResult<String> {
        self.dir.tree(&self.resolve(path)).await
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Create or fully rewrite a file.
    #[tracing::instrument(skip(self, bytes), name = "workspace.write")]
    pub async fn write_file(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> WorkspaceResult<()> {
        let resolved = self.resolve(path);
        self.store
            .put(blob_key(&resolved), bytes, content_type)
            .await?;
        Ok(())
    }

    /// Create an empty path.
    ///
    /// A directory-intent path (trailing `/`) writes a zero-byte marker
    /// blob at the directory key, which is what makes an otherwise-empty
    /// directory visible to prefix listings. A file path writes an empty
    /// blob. Creating the root is a no-op.
    #[tracing::instrument(skip(self), name = "workspace.create")]
    pub async fn create(&self, path: &str) -> WorkspaceResult<()> {
        let resolved = self.resolve(path);
        if resolved.is_empty() {
            return Ok(());
        }
        let content_type = if resolved.ends_with('/') {
            DIRECTORY_CONTENT_TYPE
        } else {
            DEFAULT_CONTENT_TYPE
        };
        self.store
            .put(blob_key(&resolved), &[], content_type)
            .await?;
        Ok(())
    }

    /// Delete a path.
    ///
    /// A file path deletes one blob and fails NotFound when absent. A
    /// directory-intent path deletes every key under the prefix, marker
    /// included; an empty directory is a no-op.
    #[tracing::instrument(skip(self), name = "workspace.delete")]
    pub async fn delete(&self, path: &str) -> WorkspaceResult<()> {
        let resolved = self.resolve(path);
        if resolved.ends_with('/') || resolved.is_empty() {
            let prefix = dir_prefix(blob_key(&resolved));
            let listing = self.store.list(&prefix, None).await?;
            tracing::debug!(prefix, count = listing.keys.len(), "deleting subtree");
            self.store.delete_many(&listing.keys).await?;
        } else {
            self.store
                .delete(blob_key(&resolved))
                .await
                .map_err(map_read_err)?;
        }
        Ok(())
    }

    /// Apply a marker-delimited search/replace spec to a file and return
    /// the new text. See [`PatchEngine::edit`] for the grammar.
    #[tracing::instrument(skip(self, edit_spec), name = "workspace.edit")]
    pub async fn edit_file(&self, path: &str, edit_spec: &str) -> WorkspaceResult<String> {
        self.patch.edit(&self.resolve(path), edit_spec).await
    }

    // ========================================================================
    // Searching
    // ========================================================================

    /// Search blob names under a subtree. See [`SearchEngine::search_names`].
    #[tracing::instrument(skip(self), name = "workspace.search_names")]
    pub async fn search_names(
        &self,
        query: &str,
        subtree: &str,
        as_pattern: bool,
    ) -> WorkspaceResult<Vec<String>> {
        self.search
            .search_names(query, &self.resolve(subtree), as_pattern)
            .await
    }

    /// Search file content under a subtree. See [`SearchEngine::grep_content`].
    #[tracing::instrument(skip(self), name = "workspace.grep")]
    pub async fn grep_content(
        &self,
        query: &str,
        subtree: &str,
        is_regex: bool,
        page: Option<u32>,
    ) -> WorkspaceResult<Vec<String>> {
        self.search
            .grep_content(query, &self.resolve(subtree), is_regex, page)
            .await
    }

    /// Search one file line by line. See [`SearchEngine::search_offset`].
    #[tracing::instrument(skip(self), name = "workspace.search_offset")]
    pub async fn search_offset(
        &self,
        query: &str,
        file_path: &str,
        is_regex: bool,
    ) -> WorkspaceResult<Vec<LineMatch>> {
        self.search
            .search_offset(query, &self.resolve(file_path), is_regex)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soko_store::MemoryStore;

    #[test]
    fn test_resolve_unconfined() {
        let ws = Workspace::new(Arc::new(MemoryStore::new()));
        assert_eq!(ws.resolve("/a/../b/c"), "b/c");
        assert_eq!(ws.resolve(""), "");
    }

    #[test]
    fn test_resolve_confined() {
        let config = WorkspaceConfig {
            root_prefix: "tenants/alpha".into(),
            ..Default::default()
        };
        let ws = Workspace::with_config(Arc::new(MemoryStore::new()), config);

        assert_eq!(ws.resolve("notes.txt"), "tenants/alpha/notes.txt");
        assert_eq!(ws.resolve("sub/"), "tenants/alpha/sub/");
        assert_eq!(ws.resolve(""), "tenants/alpha/");
        // `..` clamps before joining, so the prefix cannot be escaped
        assert_eq!(
            ws.resolve("../../../etc/passwd"),
            "tenants/alpha/etc/passwd"
        );
    }
}
