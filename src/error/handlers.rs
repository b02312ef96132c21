//! Error handlers
//!
//! Converts storage errors into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};

use crate::error::types::StorageError;

/// Error returned by every API handler.
#[derive(Debug)]
pub enum ApiError {
    Storage(StorageError),
    /// Malformed JSON, multipart or percent-encoded input.
    MalformedRequest(String),
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        ApiError::Storage(error)
    }
}

/// Map an error to its HTTP status code
pub fn error_to_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Storage(StorageError::Rejected(_)) => StatusCode::BAD_REQUEST,
        ApiError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
        ApiError::Storage(StorageError::BadRequest(_)) => StatusCode::BAD_REQUEST,
        ApiError::Storage(StorageError::Io { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
    }
}

/// Client-facing body text. I/O details are kept out of it.
fn client_message(err: &ApiError) -> String {
    match err {
        ApiError::Storage(StorageError::Rejected(_)) => "Invalid path".to_string(),
        ApiError::Storage(StorageError::NotFound(p)) => format!("Not found: {}", p),
        ApiError::Storage(StorageError::BadRequest(msg)) => msg.clone(),
        ApiError::Storage(StorageError::Io { .. }) => "Internal server error".to_string(),
        ApiError::MalformedRequest(msg) => msg.clone(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = error_to_status(&self);
        match &self {
            ApiError::Storage(e @ StorageError::Io { .. }) => error!("{}", e),
            ApiError::Storage(e) => warn!("Request refused: {}", e),
            ApiError::MalformedRequest(msg) => warn!("Malformed request: {}", msg),
        }
        (status, client_message(&self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StorageError::Rejected("../etc".into()), StatusCode::BAD_REQUEST),
            (StorageError::NotFound("a".into()), StatusCode::NOT_FOUND),
            (StorageError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                StorageError::io("rename", io::Error::other("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(error_to_status(&ApiError::from(err)), expected);
        }
        assert_eq!(
            error_to_status(&ApiError::MalformedRequest("bad json".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_io_details_are_not_sent_to_client() {
        let err = ApiError::from(StorageError::io(
            "Failed to remove /srv/files/secret",
            io::Error::from(io::ErrorKind::PermissionDenied),
        ));
        let message = client_message(&err);
        assert!(!message.contains("/srv/files"));
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn test_rejection_message_is_generic() {
        let err = ApiError::from(StorageError::Rejected("../../etc".into()));
        assert_eq!(client_message(&err), "Invalid path");
    }
}
