//! Workspace configuration.

use serde::{Deserialize, Serialize};

use crate::path::{dir_prefix, normalize};

/// Configuration for a [`Workspace`](crate::Workspace).
///
/// ```toml
/// root_prefix = "tenants/alpha"
/// max_grep_file_bytes = 1000000
/// max_grep_matches = 200
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Key prefix every operation is confined under. Empty means the whole
    /// store. Normalized `..` segments cannot climb out of it.
    pub root_prefix: String,
    /// Content search skips files larger than this.
    pub max_grep_file_bytes: usize,
    /// Cap on per-line search results.
    pub max_grep_matches: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root_prefix: String::new(),
            max_grep_file_bytes: 1_000_000,
            max_grep_matches: 200,
        }
    }
}

impl WorkspaceConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// The confinement prefix in normalized directory form (trailing `/`,
    /// no leading `/`); empty when unconfined.
    pub(crate) fn normalized_root(&self) -> String {
        dir_prefix(&normalize(&self.root_prefix))
    }
}
