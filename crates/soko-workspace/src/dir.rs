//! Directory emulation over prefix listings.
//!
//! The store has no directories, so a "directory" here is nothing but a
//! key prefix ending in `/`. Listing and tree rendering are synthesized
//! from the keys under that prefix and discarded with the request.
//!
//! A consequence this layer preserves deliberately: a directory that never
//! existed and a directory that exists but is empty are indistinguishable
//! at the store level, so both produce empty results rather than an error.

use std::collections::BTreeMap;
use std::sync::Arc;

use soko_store::BlobStore;

use crate::error::WorkspaceResult;
use crate::path::{blob_key, dir_prefix};

/// Ephemeral trie built from prefix-stripped keys; one request's tree.
#[derive(Default)]
struct DirectoryNode(BTreeMap<String, DirectoryNode>);

/// Non-recursive listings and recursive tree renderings.
pub struct DirectoryView {
    store: Arc<dyn BlobStore>,
}

impl DirectoryView {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// List the immediate children of a directory, sorted ascending.
    ///
    /// Files and one-level synthetic subdirectories (each ending in `/`)
    /// are returned with the directory prefix stripped. An empty or
    /// nonexistent directory yields an empty list.
    pub async fn list(&self, path: &str) -> WorkspaceResult<Vec<String>> {
        let prefix = dir_prefix(blob_key(path));
        let listing = self.store.list(&prefix, Some('/')).await?;

        let mut names = Vec::new();
        for key in &listing.keys {
            let name = key.strip_prefix(prefix.as_str()).unwrap_or(key);
            // The directory's own marker blob strips to nothing
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
        for sub in &listing.prefixes {
            let name = sub.strip_prefix(prefix.as_str()).unwrap_or(sub);
            names.push(name.to_string());
        }

        names.sort();
        Ok(names)
    }

    /// Render the whole subtree under a path as an ASCII tree.
    ///
    /// The root line is the prefix itself (`.` for the store root); children
    /// are sorted ascending at every level. No keys under the prefix yields
    /// an empty string.
    pub async fn tree(&self, path: &str) -> WorkspaceResult<String> {
        let prefix = blob_key(path);
        let listing = self.store.list(prefix, None).await?;
        if listing.keys.is_empty() {
            return Ok(String::new());
        }

        let mut root = DirectoryNode::default();
        for key in &listing.keys {
            let rel = key.strip_prefix(prefix).unwrap_or(key);
            let rel = rel.strip_prefix('/').unwrap_or(rel);
            if rel.is_empty() {
                continue;
            }
            let mut node = &mut root;
            for part in rel.split('/').filter(|p| !p.is_empty()) {
                node = node.0.entry(part.to_string()).or_default();
            }
        }

        let mut lines = vec![if prefix.is_empty() {
            ".".to_string()
        } else {
            prefix.to_string()
        }];
        render(&root, "", &mut lines);
        Ok(lines.join("\n"))
    }
}

/// Depth-first walk with the conventional connectors: the last child at
/// each level closes with `└── ` and indents without the continuation bar.
fn render(node: &DirectoryNode, pad: &str, lines: &mut Vec<String>) {
    let count = node.0.len();
    for (i, (name, child)) in node.0.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{pad}{connector}{name}"));

        if !child.0.is_empty() {
            let extension = if is_last { "    " } else { "│   " };
            render(child, &format!("{pad}{extension}"), lines);
        }
    }
}
