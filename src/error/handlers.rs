//! Error handlers
//!
//! Maps errors onto HTTP status codes, client-facing messages and log levels.
//! This is the only place a failed request is logged with its cause; the
//! request logging middleware records every request at `info`.

use axum::http::StatusCode;
use log::{Level, log};

use crate::error::types::{AccessError, FileServerError, RequestError, StorageError};

/// Log a file server error at a level matching its severity
pub fn handle_error(err: &FileServerError) {
    log!(error_log_level(err), "Request failed: {}", err);
}

/// Server-side failures are errors; anything the client caused is a warning
pub fn error_log_level(err: &FileServerError) -> Level {
    if error_to_status(err).is_server_error() {
        Level::Error
    } else {
        Level::Warn
    }
}

/// Convert error to HTTP status code
pub fn error_to_status(err: &FileServerError) -> StatusCode {
    match err {
        FileServerError::Storage(e) => storage_error_to_status(e),
        FileServerError::Access(AccessError::Denied(_)) => StatusCode::FORBIDDEN,
        FileServerError::Access(AccessError::Lookup(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        FileServerError::Request(RequestError::RangeNotSatisfiable(_)) => {
            StatusCode::RANGE_NOT_SATISFIABLE
        }
        FileServerError::Request(_) => StatusCode::BAD_REQUEST,
    }
}

fn storage_error_to_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::FileNotFound(_) => StatusCode::NOT_FOUND,
        StorageError::InvalidNamespace(_)
        | StorageError::InvalidPath(_)
        | StorageError::PathTraversal(_)
        | StorageError::UploadInterrupted(_) => StatusCode::BAD_REQUEST,
        StorageError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message returned to the client in the `error` field of the response body
pub fn error_message(err: &FileServerError) -> String {
    match err {
        FileServerError::Storage(StorageError::FileNotFound(_)) => "File does not exist".into(),
        FileServerError::Access(AccessError::Denied(_)) => "Bad password".into(),
        FileServerError::Storage(e) => e.to_string(),
        FileServerError::Access(e) => e.to_string(),
        FileServerError::Request(e) => e.to_string(),
    }
}
