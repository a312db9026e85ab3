//! Workspace error types.

use soko_store::StoreError;
use thiserror::Error;

/// Workspace error type.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A file read (or the read half of an edit) targeted an absent key.
    #[error("not found: {0}")]
    NotFound(String),

    /// An edit block's search text matched more than once.
    #[error("search text matched more than once: {search:?}")]
    AmbiguousEdit {
        /// The offending search text.
        search: String,
    },

    /// A regex or glob query was malformed.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// PDF text extraction failed.
    #[error("pdf extraction failed: {0}")]
    PdfExtraction(String),

    /// The blob store itself failed. Never retried here.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkspaceError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an InvalidPattern error.
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }
}

/// Map a store error from a file-targeted read into the workspace taxonomy:
/// an absent key is the caller's NotFound, everything else stays a store
/// failure.
pub(crate) fn map_read_err(err: StoreError) -> WorkspaceError {
    match err {
        StoreError::NotFound(key) => WorkspaceError::NotFound(key),
        other => WorkspaceError::Store(other),
    }
}

/// Workspace result type.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
