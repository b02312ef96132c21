//! Transfer result types
//!
//! Defines result structures returned by transfer operations.

use tokio::fs::File;

use crate::storage::ConfinedPath;

/// An opened file ready to be streamed to the client.
#[derive(Debug)]
pub struct Download {
    pub file: File,
    /// Last path segment, used for `Content-Disposition`.
    pub file_name: String,
    pub size: u64,
    pub path: ConfinedPath,
}
