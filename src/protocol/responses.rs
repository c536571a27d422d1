//! HTTP response bodies
//!
//! JSON shapes returned by the file endpoints, and the mapping of server
//! errors onto responses.

use axum::Json;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::{FileServerError, RequestError};
use crate::error::handlers::{error_message, error_to_status, handle_error};

/// Body of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub file_name: String,
}

impl UploadResponse {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            success: true,
            file_name: file_name.into(),
        }
    }
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for FileServerError {
    fn into_response(self) -> Response {
        handle_error(&self);
        let body = ErrorResponse {
            error: error_message(&self),
        };
        let mut response = (error_to_status(&self), Json(body)).into_response();

        if let FileServerError::Request(RequestError::RangeNotSatisfiable(len)) = &self {
            if let Ok(value) = HeaderValue::try_from(format!("bytes */{}", len)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }

        response
    }
}
