//! Name and content search across a subtree.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use soko_store::{BlobStore, StoreError};

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::path::blob_key;

/// One matching line from an offset search. 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMatch {
    pub line: u32,
    pub content: String,
}

/// A compiled content query: literal substring or regex.
enum Matcher {
    Literal(String),
    Regex(regex::Regex),
}

impl Matcher {
    fn new(query: &str, is_regex: bool) -> WorkspaceResult<Self> {
        if is_regex {
            let re = regex::Regex::new(query)
                .map_err(|e| WorkspaceError::invalid_pattern(e.to_string()))?;
            Ok(Self::Regex(re))
        } else {
            Ok(Self::Literal(query.to_string()))
        }
    }

    fn is_match(&self, haystack: &str) -> bool {
        match self {
            Self::Literal(q) => haystack.contains(q.as_str()),
            Self::Regex(re) => re.is_match(haystack),
        }
    }
}

/// Searches file names and file content under a subtree.
pub struct SearchEngine {
    store: Arc<dyn BlobStore>,
    /// Files larger than this are skipped by content search.
    max_file_bytes: usize,
    /// Cap on offset-search results.
    max_matches: usize,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn BlobStore>, max_file_bytes: usize, max_matches: usize) -> Self {
        Self {
            store,
            max_file_bytes,
            max_matches,
        }
    }

    /// Find keys under `subtree` whose full name matches the query.
    ///
    /// With `as_pattern` the query is a shell glob matched against the full
    /// key (invalid globs fail with
    /// [`WorkspaceError::InvalidPattern`]); otherwise a case-sensitive
    /// substring. Results come back in store-listing order.
    pub async fn search_names(
        &self,
        query: &str,
        subtree: &str,
        as_pattern: bool,
    ) -> WorkspaceResult<Vec<String>> {
        let listing = self.store.list(blob_key(subtree), None).await?;

        if as_pattern {
            let pattern = glob::Pattern::new(query)
                .map_err(|e| WorkspaceError::invalid_pattern(e.to_string()))?;
            // Shell semantics: `*` must not cross `/`
            let options = glob::MatchOptions {
                case_sensitive: true,
                require_literal_separator: true,
                require_literal_leading_dot: false,
            };
            Ok(listing
                .keys
                .into_iter()
                .filter(|key| pattern.matches_with(key, options))
                .collect())
        } else {
            Ok(listing
                .keys
                .into_iter()
                .filter(|key| key.contains(query))
                .collect())
        }
    }

    /// Find files under `subtree` whose decoded text contains the query.
    ///
    /// Directory markers and non-UTF-8 payloads are skipped silently, so an
    /// empty result means no real matches; a malformed regex is the
    /// distinct [`WorkspaceError::InvalidPattern`]. `page` is reserved and
    /// currently has no effect.
    pub async fn grep_content(
        &self,
        query: &str,
        subtree: &str,
        is_regex: bool,
        page: Option<u32>,
    ) -> WorkspaceResult<Vec<String>> {
        let _ = page; // reserved
        let matcher = Matcher::new(query, is_regex)?;

        let listing = self.store.list(blob_key(subtree), None).await?;
        let mut hits = Vec::new();

        for key in listing.keys {
            if key.ends_with('/') {
                continue;
            }
            let bytes = match self.store.get(&key).await {
                Ok(b) => b,
                // Deleted between list and get: treat as gone
                Err(StoreError::NotFound(_)) => continue,
                Err(e) => return Err(e.into()),
            };
            if bytes.len() > self.max_file_bytes {
                tracing::debug!(key, size = bytes.len(), "skipping oversized file");
                continue;
            }
            let Ok(text) = String::from_utf8(bytes) else {
                continue;
            };
            if matcher.is_match(&text) {
                hits.push(key);
            }
        }
        Ok(hits)
    }

    /// Find matching lines within one file.
    ///
    /// A path that does not resolve to a file blob yields an empty result,
    /// not an error. Line numbers are 1-based; lines come back in file
    /// order, capped at the configured match limit.
    pub async fn search_offset(
        &self,
        query: &str,
        file_path: &str,
        is_regex: bool,
    ) -> WorkspaceResult<Vec<LineMatch>> {
        let matcher = Matcher::new(query, is_regex)?;

        let key = blob_key(file_path);
        if key.is_empty() || key.ends_with('/') {
            return Ok(Vec::new());
        }
        let bytes = match self.store.get(key).await {
            Ok(b) => b,
            Err(StoreError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let Ok(text) = String::from_utf8(bytes) else {
            return Ok(Vec::new());
        };

        let mut matches = Vec::new();
        for (idx, line) in text.split('\n').enumerate() {
            if matches.len() >= self.max_matches {
                break;
            }
            if matcher.is_match(line) {
                matches.push(LineMatch {
                    line: (idx + 1) as u32,
                    content: line.to_string(),
                });
            }
        }
        Ok(matches)
    }
}
