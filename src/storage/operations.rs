//! Storage operations
//!
//! Directory listing, whole-tree indexing, directory creation, rename and
//! delete. Every operation confines its own client paths before touching
//! the filesystem, so callers cannot hand in an unchecked path.
//!
//! There is no locking: concurrent requests on overlapping paths race at the
//! filesystem level and the last call wins.

use log::{debug, info};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{StorageError, display_relative};
use crate::storage::filesystem::describe;
use crate::storage::results::{ConfinedPath, EntryDescriptor};
use crate::storage::validation::{confine, relative_slash_path};

/// Lists the immediate children of a directory, sorted by name.
///
/// Enumeration is best-effort: an entry whose directory record or metadata
/// cannot be read is skipped instead of failing the listing, and so is one
/// whose name is not valid UTF-8. Metadata is read without following
/// symlinks.
pub fn list_directory(
    server_root: &Path,
    client_path: &str,
) -> Result<Vec<EntryDescriptor>, StorageError> {
    let dir = confine(server_root, client_path)?;

    let entries = fs::read_dir(dir.absolute()).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotADirectory {
            StorageError::BadRequest(format!("Not a directory: {}", dir.relative()))
        } else {
            StorageError::from_io(
                dir.relative(),
                format!("Failed to read directory {}", dir.absolute().display()),
                e,
            )
        }
    })?;

    let mut listing = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let Ok(name) = entry.file_name().into_string() else {
            debug!("Skipping non-UTF-8 entry {}", entry.path().display());
            continue;
        };
        let Ok(metadata) = entry.metadata() else {
            debug!("Skipping unreadable entry {}", entry.path().display());
            continue;
        };
        let path = dir.child_relative(&name);
        listing.push(describe(name, path, &metadata));
    }
    listing.sort_by(|a, b| a.name.cmp(&b.name));

    info!(
        "Listed directory {} - {} entries",
        display_relative(dir.relative()),
        listing.len()
    );
    Ok(listing)
}

/// Walks the whole tree and returns one descriptor per non-directory entry.
///
/// Symlinks are reported as entries, not followed. Entries with a
/// non-UTF-8 name anywhere in their path are skipped. The first walk error
/// aborts the index.
pub fn build_index(server_root: &Path) -> Result<Vec<EntryDescriptor>, StorageError> {
    let root = confine(server_root, "")?;
    let mut index = Vec::new();

    for entry in WalkDir::new(root.absolute())
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            StorageError::io(format!("Failed to walk {}", path), e.into())
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let Some(path) = relative_slash_path(root.absolute(), entry.path()) else {
            debug!("Skipping non-UTF-8 entry {}", entry.path().display());
            continue;
        };
        let metadata = entry.metadata().map_err(|e| {
            StorageError::io(
                format!("Failed to read metadata of {}", entry.path().display()),
                e.into(),
            )
        })?;
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        index.push(describe(name, path, &metadata));
    }

    info!("Indexed server root - {} files", index.len());
    Ok(index)
}

/// Creates a directory and any missing parents. Existing directories are
/// not an error.
pub fn create_directory(
    server_root: &Path,
    client_path: &str,
) -> Result<ConfinedPath, StorageError> {
    let dir = confine(server_root, client_path)?;

    fs::create_dir_all(dir.absolute()).map_err(|e| {
        StorageError::io(
            format!("Failed to create directory {}", dir.absolute().display()),
            e,
        )
    })?;

    info!("Created directory {}", display_relative(dir.relative()));
    Ok(dir)
}

/// Moves `old_path` to `new_path`. Both sides are confined independently.
///
/// Existence of the source is checked first and the rename attempted after;
/// a concurrent delete in between surfaces as an I/O failure.
pub fn rename_entry(
    server_root: &Path,
    old_path: &str,
    new_path: &str,
) -> Result<(), StorageError> {
    let source = confine(server_root, old_path)?;
    let target = confine(server_root, new_path)?;
    refuse_root(&source, "rename")?;
    refuse_root(&target, "rename")?;

    if let Err(e) = fs::symlink_metadata(source.absolute()) {
        return Err(StorageError::from_io(
            source.relative(),
            format!("Failed to stat {}", source.absolute().display()),
            e,
        ));
    }

    fs::rename(source.absolute(), target.absolute()).map_err(|e| {
        StorageError::io(
            format!(
                "Failed to rename {} to {}",
                source.absolute().display(),
                target.absolute().display()
            ),
            e,
        )
    })?;

    info!("Renamed {} to {}", source.relative(), target.relative());
    Ok(())
}

/// Deletes a file, symlink or whole directory subtree.
pub fn delete_entry(server_root: &Path, client_path: &str) -> Result<(), StorageError> {
    let target = confine(server_root, client_path)?;
    refuse_root(&target, "delete")?;

    let metadata = fs::symlink_metadata(target.absolute()).map_err(|e| {
        StorageError::from_io(
            target.relative(),
            format!("Failed to stat {}", target.absolute().display()),
            e,
        )
    })?;

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(target.absolute())
    } else {
        fs::remove_file(target.absolute())
    };
    removed.map_err(|e| {
        StorageError::io(
            format!("Failed to delete {}", target.absolute().display()),
            e,
        )
    })?;

    info!("Deleted {}", target.relative());
    Ok(())
}

/// The root itself can be listed and written into, never moved or removed.
fn refuse_root(path: &ConfinedPath, action: &str) -> Result<(), StorageError> {
    if path.is_root() {
        Err(StorageError::BadRequest(format!(
            "Cannot {} the server root",
            action
        )))
    } else {
        Ok(())
    }
}
