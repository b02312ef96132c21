//! Transfer module
//!
//! Handles streaming uploads to disk and downloads back to the client.

pub mod disposition;
pub mod file_ops;
pub mod results;

// Re-export key types and functions
pub use disposition::content_disposition;
pub use file_ops::{open_download, prepare_upload_dir, store_file, upload_file_name};
pub use results::Download;
