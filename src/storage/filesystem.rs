//! File system helpers
//!
//! Builds entry descriptors from file metadata.

use chrono::{DateTime, Local, SecondsFormat};
use std::fs::Metadata;
use std::time::SystemTime;

use crate::storage::results::EntryDescriptor;

/// Builds a descriptor from metadata. Directories report size 0.
pub fn describe(name: String, path: String, metadata: &Metadata) -> EntryDescriptor {
    let is_dir = metadata.is_dir();
    EntryDescriptor {
        name,
        is_dir,
        size: if is_dir { 0 } else { metadata.len() },
        mod_time: metadata
            .modified()
            .map(format_mod_time)
            .unwrap_or_else(|_| format_mod_time(SystemTime::UNIX_EPOCH)),
        path,
    }
}

/// RFC 3339 with second precision in the local timezone, `Z` for UTC.
pub fn format_mod_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
}
