//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A client path that passed [`confine`](crate::storage::validation::confine).
///
/// Only the validation module can build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfinedPath {
    absolute: PathBuf,
    relative: String,
}

impl ConfinedPath {
    pub(crate) fn new(absolute: PathBuf, relative: String) -> Self {
        Self { absolute, relative }
    }

    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Forward-slash path relative to the server root, empty for the root.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }

    /// Relative path of a direct child named `name`.
    pub fn child_relative(&self, name: &str) -> String {
        if self.is_root() {
            name.to_string()
        } else {
            format!("{}/{}", self.relative, name)
        }
    }
}

/// One directory entry as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDescriptor {
    pub name: String,
    pub is_dir: bool,
    /// Bytes; always 0 for directories.
    pub size: u64,
    /// RFC 3339, local timezone.
    pub mod_time: String,
    /// Relative to the server root, `/`-separated.
    pub path: String,
}

/// Result of storing one uploaded file
#[derive(Debug, Clone)]
pub struct StoreResult {
    pub path: ConfinedPath,
    pub bytes_written: u64,
}
