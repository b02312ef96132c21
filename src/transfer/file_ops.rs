//! Module `file_ops`
//!
//! Streams uploaded files to disk and opens files for download. Each
//! uploaded file holds one destination handle and one source stream; both
//! are released when `store_file` returns, on success or failure.

use log::{error, info};
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::error::{StorageError, display_relative};
use crate::storage::{ConfinedPath, StoreResult, confine, join_client_path};
use crate::transfer::results::Download;

const BUFFER_SIZE: usize = 64 * 1024;

/// Confines the upload directory and creates it if missing.
pub async fn prepare_upload_dir(
    server_root: &Path,
    client_dir: &str,
) -> Result<ConfinedPath, StorageError> {
    let dir = confine(server_root, client_dir)?;
    fs::create_dir_all(dir.absolute()).await.map_err(|e| {
        StorageError::io(
            format!("Cannot create upload directory {}", dir.absolute().display()),
            e,
        )
    })?;
    Ok(dir)
}

/// The final path segment of a client-supplied file name, with either
/// separator style. `None` if nothing usable is left.
pub fn upload_file_name(filename: &str) -> Option<&str> {
    filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Writes one uploaded file into `dir`, creating or truncating it.
///
/// Directory components in `filename` are stripped and the result is
/// confined again. A source read error means the client stream broke and is
/// reported as a bad request; write errors are I/O failures. A partially
/// written file is left in place.
pub async fn store_file<R>(
    server_root: &Path,
    dir: &ConfinedPath,
    filename: &str,
    source: &mut R,
) -> Result<StoreResult, StorageError>
where
    R: AsyncRead + Unpin,
{
    let name = upload_file_name(filename)
        .ok_or_else(|| StorageError::BadRequest(format!("Invalid file name: {}", filename)))?;

    let target = match confine(server_root, &join_client_path(dir.relative(), name)) {
        Ok(target) => target,
        Err(StorageError::Rejected(p)) => {
            return Err(StorageError::BadRequest(format!("Invalid file path: {}", p)));
        }
        Err(e) => return Err(e),
    };

    let mut file = File::create(target.absolute()).await.map_err(|e| {
        StorageError::io(
            format!("Error creating file {}", target.absolute().display()),
            e,
        )
    })?;

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total_bytes_received = 0u64;

    loop {
        let n = match source.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                error!("Upload stream for {} interrupted: {}", target.relative(), e);
                return Err(StorageError::BadRequest(format!(
                    "Upload of {} was interrupted",
                    target.relative()
                )));
            }
        };

        file.write_all(&buffer[..n]).await.map_err(|e| {
            StorageError::io(
                format!("Error saving file {}", target.absolute().display()),
                e,
            )
        })?;
        total_bytes_received += n as u64;
    }

    file.flush().await.map_err(|e| {
        StorageError::io(
            format!("Error flushing file {}", target.absolute().display()),
            e,
        )
    })?;

    info!(
        "Stored {} ({} bytes)",
        target.relative(),
        total_bytes_received
    );

    Ok(StoreResult {
        path: target,
        bytes_written: total_bytes_received,
    })
}

/// Opens a regular file for streaming to the client.
pub async fn open_download(
    server_root: &Path,
    client_path: &str,
) -> Result<Download, StorageError> {
    let target = confine(server_root, client_path)?;

    let metadata = fs::metadata(target.absolute()).await.map_err(|e| {
        StorageError::from_io(
            target.relative(),
            format!("Failed to stat {}", target.absolute().display()),
            e,
        )
    })?;
    if !metadata.is_file() {
        return Err(StorageError::BadRequest(format!(
            "Not a file: {}",
            display_relative(target.relative())
        )));
    }

    let file = File::open(target.absolute()).await.map_err(|e| {
        StorageError::from_io(
            target.relative(),
            format!("Failed to open {}", target.absolute().display()),
            e,
        )
    })?;

    let file_name = target
        .relative()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();

    Ok(Download {
        file,
        file_name,
        size: metadata.len(),
        path: target,
    })
}
