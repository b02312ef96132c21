//! Error types
//!
//! Defines the error taxonomy shared by the storage, transfer and server modules.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Storage and transfer errors.
///
/// Messages carry client-relative paths only. Absolute paths stay inside the
/// `Io` context string, which is logged but never sent to the client.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The client path resolves outside the server root.
    #[error("Path rejected: {0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Well-formed path, but the request cannot be honored as given.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Wraps an I/O error with a short description of the failed step.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StorageError::Io {
            context: context.into(),
            source,
        }
    }

    /// Maps `NotFound` I/O errors to [`StorageError::NotFound`] and everything
    /// else to [`StorageError::Io`].
    pub fn from_io(relative: &str, context: impl Into<String>, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound(display_relative(relative))
        } else {
            StorageError::io(context, source)
        }
    }
}

/// Renders a root-relative path for messages; the root itself shows as `/`.
pub fn display_relative(relative: &str) -> String {
    if relative.is_empty() {
        "/".to_string()
    } else {
        relative.to_string()
    }
}

/// Errors that stop the server from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid server root {path:?}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Server failed: {0}")]
    Serve(#[from] io::Error),
}
