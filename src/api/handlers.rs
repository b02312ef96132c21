//! Request handlers for the file API.
//!
//! Handlers only extract parameters and shape responses. Path confinement
//! and all filesystem work happen in the storage and transfer modules.

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;
use log::info;
use percent_encoding::percent_decode_str;
use std::io;
use tokio_util::io::{ReaderStream, StreamReader};

use crate::api::requests::{DeleteRequest, MkdirRequest, PathQuery, RenameRequest};
use crate::api::AppState;
use crate::error::{ApiError, StorageError};
use crate::storage::{self, EntryDescriptor, join_client_path};
use crate::transfer::{self, content_disposition};

/// Multipart field carrying uploaded files.
pub const UPLOAD_FIELD: &str = "files";

pub const DOWNLOAD_PREFIX: &str = "/api/download/";

/// Runs synchronous filesystem work off the async executor.
async fn blocking<T, F>(task: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| StorageError::io("Filesystem task failed", io::Error::other(e)))?
}

fn query_path(query: Result<Query<PathQuery>, QueryRejection>) -> Result<String, ApiError> {
    query
        .map(|Query(query)| query.path)
        .map_err(|e| ApiError::MalformedRequest(e.body_text()))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::MalformedRequest(format!("Invalid request: {}", e.body_text())))
}

/// `GET /api/list?path=<rel>`
pub async fn handle_list(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> Result<Json<Vec<EntryDescriptor>>, ApiError> {
    let path = query_path(query)?;
    let root = state.shared_root();
    let entries = blocking(move || storage::list_directory(&root, &path)).await?;
    Ok(Json(entries))
}

/// `GET /api/getIndex`
pub async fn handle_index(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntryDescriptor>>, ApiError> {
    let root = state.shared_root();
    let index = blocking(move || storage::build_index(&root)).await?;
    Ok(Json(index))
}

/// `POST /api/upload?path=<rel>` with one or more `files` fields.
///
/// Files are written in request order. The first failure ends the request;
/// files already stored stay on disk.
pub async fn handle_upload(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, ApiError> {
    let path = query_path(query)?;
    let mut multipart = multipart
        .map_err(|e| ApiError::MalformedRequest(format!("Error parsing form: {}", e.body_text())))?;

    let dir = transfer::prepare_upload_dir(state.root(), &path).await?;

    let mut stored = 0usize;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MalformedRequest(format!("Error parsing form: {}", e.body_text())))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let reader = StreamReader::new(field.map_err(io::Error::other));
        tokio::pin!(reader);
        transfer::store_file(state.root(), &dir, &filename, &mut reader).await?;
        stored += 1;
    }

    info!(
        "Upload into {} complete - {} files",
        crate::error::display_relative(dir.relative()),
        stored
    );
    Ok(StatusCode::CREATED)
}

/// `POST /api/rename` with `{old, new}`
pub async fn handle_rename(
    State(state): State<AppState>,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = json_body(payload)?;
    let root = state.shared_root();
    blocking(move || storage::rename_entry(&root, &request.old, &request.new)).await?;
    Ok(StatusCode::OK)
}

/// `POST /api/delete` with `{path}`
pub async fn handle_delete(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = json_body(payload)?;
    let root = state.shared_root();
    blocking(move || storage::delete_entry(&root, &request.path)).await?;
    Ok(StatusCode::OK)
}

/// `POST /api/mkdir` with `{path, name}`
pub async fn handle_mkdir(
    State(state): State<AppState>,
    payload: Result<Json<MkdirRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = json_body(payload)?;
    if request.name.trim().is_empty() {
        return Err(ApiError::MalformedRequest("Directory name required".into()));
    }
    let target = join_client_path(&request.path, &request.name);
    let root = state.shared_root();
    blocking(move || storage::create_directory(&root, &target)).await?;
    Ok(StatusCode::CREATED)
}

/// `GET /api/download/<percent-encoded rel path>`
pub async fn handle_download(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, ApiError> {
    let encoded = uri.path().strip_prefix(DOWNLOAD_PREFIX).unwrap_or_default();
    if encoded.is_empty() {
        return Err(ApiError::MalformedRequest("Filename required".into()));
    }
    let client_path = decode_client_path(encoded)
        .ok_or_else(|| ApiError::MalformedRequest("Invalid filename".into()))?;

    let download = transfer::open_download(state.root(), &client_path).await?;
    info!(
        "Starting download of {} ({} bytes)",
        download.path.relative(),
        download.size
    );

    let disposition = HeaderValue::from_bytes(content_disposition(&download.file_name).as_bytes())
        .map_err(|_| ApiError::MalformedRequest("Invalid filename".into()))?;
    let body = Body::from_stream(ReaderStream::new(download.file));

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(download.size)),
        ],
        body,
    )
        .into_response())
}

/// Strict percent-decoding: every `%` must start a two-digit hex escape and
/// the result must be UTF-8.
fn decode_client_path(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    for (i, byte) in bytes.iter().enumerate() {
        if *byte == b'%' {
            let escape = bytes.get(i + 1..i + 3)?;
            if !escape.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
        }
    }
    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
