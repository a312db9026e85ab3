//! Search/replace patching with marker-delimited edit blocks.
//!
//! # Edit block grammar
//!
//! One grammar, line-anchored. A block is three sections bounded by marker
//! lines, where a marker line is any line that starts (after trailing
//! whitespace is trimmed) with the marker string:
//!
//! ```text
//! >>>>>
//! text to find
//! =====
//! text to put in its place
//! <<<<<
//! ```
//!
//! Parsing is tolerant: anything outside a block is ignored, and a block
//! missing its divider or terminator at end of input is dropped.
//!
//! # Application
//!
//! Blocks apply in order against the evolving text. A search text with no
//! occurrence skips its block; more than one occurrence aborts the whole
//! call with [`WorkspaceError::AmbiguousEdit`] before anything is written,
//! so a failed call never changes the stored file. Matching is literal
//! substring comparison, never regex.

use std::sync::Arc;

use soko_store::BlobStore;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::path::blob_key;
use crate::read::ContentReader;

const BLOCK_OPEN: &str = ">>>>>";
const BLOCK_DIVIDER: &str = "=====";
const BLOCK_CLOSE: &str = "<<<<<";

/// One parsed (search, replace) pair. Lives for a single edit call.
#[derive(Debug, PartialEq)]
struct EditBlock {
    search: String,
    replace: String,
}

/// Applies marker-delimited search/replace specs to stored files.
pub struct PatchEngine {
    store: Arc<dyn BlobStore>,
    reader: ContentReader,
}

impl PatchEngine {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        let reader = ContentReader::new(store.clone());
        Self { store, reader }
    }

    /// Parse `edit_spec` and apply its blocks to the file at `path`.
    ///
    /// The fully modified text is written back as a whole-file overwrite
    /// and returned. A spec with no recognizable blocks rewrites the
    /// unchanged content.
    pub async fn edit(&self, path: &str, edit_spec: &str) -> WorkspaceResult<String> {
        let mut text = self.reader.read(path, None, None, None).await?;

        let blocks = parse_blocks(edit_spec);
        tracing::debug!(path, blocks = blocks.len(), "applying edit spec");

        for block in &blocks {
            let occurrences = text.match_indices(block.search.as_str()).count();
            match occurrences {
                // Not applied; the call still succeeds
                0 => continue,
                1 => text = text.replacen(block.search.as_str(), &block.replace, 1),
                _ => {
                    return Err(WorkspaceError::AmbiguousEdit {
                        search: block.search.clone(),
                    });
                }
            }
        }

        self.store
            .put(blob_key(path), text.as_bytes(), "text/plain; charset=utf-8")
            .await?;
        Ok(text)
    }
}

fn parse_blocks(spec: &str) -> Vec<EditBlock> {
    enum State {
        Outside,
        Search,
        Replace,
    }

    let mut blocks = Vec::new();
    let mut state = State::Outside;
    let mut search: Vec<&str> = Vec::new();
    let mut replace: Vec<&str> = Vec::new();

    for line in spec.split('\n') {
        let marker = line.trim_end();
        state = match state {
            State::Outside => {
                if marker.starts_with(BLOCK_OPEN) {
                    search.clear();
                    replace.clear();
                    State::Search
                } else {
                    State::Outside
                }
            }
            State::Search => {
                if marker.starts_with(BLOCK_DIVIDER) {
                    State::Replace
                } else {
                    search.push(line);
                    State::Search
                }
            }
            State::Replace => {
                if marker.starts_with(BLOCK_CLOSE) {
                    blocks.push(EditBlock {
                        search: search.join("\n"),
                        replace: replace.join("\n"),
                    });
                    State::Outside
                } else {
                    replace.push(line);
                    State::Replace
                }
            }
        };
    }

    // A block still open at end of input is malformed and dropped
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use soko_store::MemoryStore;

    fn spec(search: &str, replace: &str) -> String {
        format!(">>>>>\n{search}\n=====\n{replace}\n<<<<<\n")
    }

    async fn engine_with(key: &str, content: &str) -> (Arc<MemoryStore>, PatchEngine) {
        let store = Arc::new(MemoryStore::new());
        store.put(key, content.as_bytes(), "text/plain").await.unwrap();
        let engine = PatchEngine::new(store.clone());
        (store, engine)
    }

    #[tokio::test]
    async fn test_unique_match_replaces() {
        let (store, engine) = engine_with("a.ts", "const debug = false;").await;

        let out = engine.edit("a.ts", &spec("false", "true")).await.unwrap();
        assert_eq!(out, "const debug = true;");
        assert_eq!(store.get("a.ts").await.unwrap(), b"const debug = true;");
    }

    #[tokio::test]
    async fn test_ambiguous_match_fails_without_write() {
        let (store, engine) = engine_with("a.txt", "x x").await;

        let err = engine.edit("a.txt", &spec("x", "y")).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::AmbiguousEdit { search } if search == "x"));
        assert_eq!(store.get("a.txt").await.unwrap(), b"x x");
    }

    #[tokio::test]
    async fn test_zero_match_block_is_skipped() {
        let (store, engine) = engine_with("a.txt", "hello").await;

        let out = engine.edit("a.txt", &spec("absent", "whatever")).await.unwrap();
        assert_eq!(out, "hello");
        assert_eq!(store.get("a.txt").await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_blocks_apply_in_order_against_current_text() {
        let (_, engine) = engine_with("a.txt", "one two").await;

        let spec = format!("{}{}", spec("one", "1"), spec("1 two", "done"));
        let out = engine.edit("a.txt", &spec).await.unwrap();
        assert_eq!(out, "done");
    }

    #[tokio::test]
    async fn test_earlier_blocks_do_not_leak_on_later_failure() {
        let (store, engine) = engine_with("a.txt", "alpha beta beta").await;

        let spec = format!("{}{}", spec("alpha", "A"), spec("beta", "B"));
        assert!(engine.edit("a.txt", &spec).await.is_err());
        // The first block had applied in memory, but nothing was written
        assert_eq!(store.get("a.txt").await.unwrap(), b"alpha beta beta");
    }

    #[tokio::test]
    async fn test_empty_spec_rewrites_unchanged() {
        let (store, engine) = engine_with("a.txt", "same").await;

        let out = engine.edit("a.txt", "no blocks here").await.unwrap();
        assert_eq!(out, "same");
        assert_eq!(store.get("a.txt").await.unwrap(), b"same");
    }

    #[tokio::test]
    async fn test_edit_absent_file_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let engine = PatchEngine::new(store);
        let err = engine.edit("nope.txt", &spec("a", "b")).await.unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound(_)));
    }

    #[test]
    fn test_parse_multiline_block() {
        let blocks = parse_blocks(">>>>>\nfn a() {\n    1\n}\n=====\nfn a() {\n    2\n}\n<<<<<");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].search, "fn a() {\n    1\n}");
        assert_eq!(blocks[0].replace, "fn a() {\n    2\n}");
    }

    #[test]
    fn test_parse_ignores_surrounding_prose() {
        let blocks = parse_blocks("Here is the change:\n>>>>>\nold\n=====\nnew\n<<<<<\nDone.");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].search, "old");
    }

    #[test]
    fn test_parse_drops_unterminated_block() {
        assert!(parse_blocks(">>>>>\nold\n=====\nnew").is_empty());
        assert!(parse_blocks(">>>>>\nold only").is_empty());
    }

    #[test]
    fn test_parse_longer_marker_runs_accepted() {
        let blocks = parse_blocks(">>>>>>> SEARCH\nold\n=======\nnew\n<<<<<<< REPLACE");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].replace, "new");
    }

    #[test]
    fn test_parse_empty_replacement_deletes() {
        let blocks = parse_blocks(">>>>>\ngone\n=====\n<<<<<");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].search, "gone");
        assert_eq!(blocks[0].replace, "");
    }
}
