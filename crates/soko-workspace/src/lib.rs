//! # soko-workspace
//!
//! A virtual filesystem over a flat blob store, shaped for the file tools
//! an agent actually calls: read, list, tree, write, edit, search.
//!
//! The backing store has no directories; every hierarchical view here is
//! synthesized per request from key prefixes and discarded afterwards.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Caller (transport layer)         │
//! └────────────────────┬────────────────────┘
//!                      │ normalized path + params
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │           Workspace (facade)            │
//! │  path normalization, prefix confinement │
//! └────────────────────┬────────────────────┘
//!                      │
//!     ┌─────────┬──────┴──────┬───────────┐
//!     ▼         ▼             ▼           ▼
//! ┌────────┐ ┌────────┐ ┌───────────┐ ┌────────┐
//! │DirView │ │Content │ │PatchEngine│ │Search  │
//! │        │ │Reader  │ │(uses      │ │Engine  │
//! │        │ │        │ │ Reader)   │ │        │
//! └────┬───┘ └───┬────┘ └─────┬─────┘ └───┬────┘
//!      └─────────┴─────┬──────┴───────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │        BlobStore (soko-store)           │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Every operation is a stateless, request-scoped transaction against the
//! store: no shared mutable state, no locking, no cross-request caching.
//! Two concurrent edits of the same file race; the last whole-file write
//! wins.

pub mod config;
pub mod dir;
pub mod edit;
mod error;
pub mod path;
pub mod read;
pub mod search;
mod workspace;

pub use config::WorkspaceConfig;
pub use dir::DirectoryView;
pub use edit::PatchEngine;
pub use error::{WorkspaceError, WorkspaceResult};
pub use path::{blob_key, normalize};
pub use read::ContentReader;
pub use search::{LineMatch, SearchEngine};
pub use workspace::Workspace;
