//! File system storage management
//!
//! Path confinement plus the directory-level file operations.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

pub use operations::{build_index, create_directory, delete_entry, list_directory, rename_entry};
pub use results::{ConfinedPath, EntryDescriptor, StoreResult};
pub use validation::{confine, join_client_path};
