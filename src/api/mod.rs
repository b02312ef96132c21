//! HTTP API
//!
//! Routes the `/api/*` endpoints to their handlers. The server root is the
//! only state shared between requests and never changes after startup.

pub mod handlers;
pub mod requests;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::middleware::logging::log_request;
use handlers::{
    handle_delete, handle_download, handle_index, handle_list, handle_mkdir, handle_rename,
    handle_upload,
};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    root: Arc<PathBuf>,
}

impl AppState {
    /// `root` should already be absolute and canonical.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Owned handle for moving into blocking tasks.
    pub fn shared_root(&self) -> Arc<PathBuf> {
        Arc::clone(&self.root)
    }
}

/// Builds the API router. `upload_limit` caps the upload request body in bytes.
pub fn router(state: AppState, upload_limit: usize) -> Router {
    Router::new()
        .route("/api/list", get(handle_list))
        .route("/api/getIndex", get(handle_index))
        .route(
            "/api/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/rename", post(handle_rename))
        .route("/api/delete", post(handle_delete))
        .route("/api/mkdir", post(handle_mkdir))
        .route("/api/download/", get(handle_download))
        .route("/api/download/{*path}", get(handle_download))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
