//! # soko-store
//!
//! The object-store boundary for soko.
//!
//! An object store is a flat key → byte-sequence map with prefix listing;
//! there are no native directories. Everything hierarchical that soko
//! exposes is synthesized above this boundary from key prefixes.
//!
//! Key components:
//!
//! - [`BlobStore`] - Core trait for store operations
//! - [`Listing`] - Result of a prefix listing (keys + one-level prefixes)
//! - [`MemoryStore`] - In-memory store (for testing, local runs)
//!
//! ## Design Decisions
//!
//! - **Flat keys, no handles**: Operations take `&str` keys, never open
//!   handles. Each call is one round trip against the backing store.
//! - **Delimiter listing**: `list` with a delimiter folds deeper keys into
//!   one-level synthetic prefixes, matching what cloud object stores do.
//! - **The store is the sole owner of content**: nothing above this
//!   boundary caches blob bytes across calls.

mod error;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{BlobStore, Listing};
