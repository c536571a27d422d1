//! Request handlers for the file endpoints.
//!
//! Handlers only extract request data and shape responses; storage and
//! access decisions live in `FileService`.

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use futures_util::TryStreamExt;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;

use crate::auth::Credential;
use crate::error::{FileServerError, RequestError};
use crate::protocol::responses::UploadResponse;
use crate::protocol::serve::serve_object;
use crate::service::FileService;
use crate::storage::ByteStore;

/// Multipart field carrying the uploaded content
pub const FORM_FILE_FIELD: &str = "file";

/// Handles `POST /files/{namespace}/{*file_path}`.
///
/// The `file` form field is streamed straight into storage. The
/// `Authorization` header, if present and non-empty, is the raw password to
/// gate the file with.
pub async fn upload_file<B: ByteStore>(
    State(service): State<Arc<FileService<B>>>,
    Path((namespace, file_path)): Path<(String, String)>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, FileServerError> {
    let mut multipart =
        multipart.map_err(|e| RequestError::MalformedUpload(e.body_text()))?;
    let credential = Credential::from_header(headers.get(header::AUTHORIZATION));

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RequestError::MalformedUpload(e.body_text()))?
    {
        if field.name() != Some(FORM_FILE_FIELD) {
            continue;
        }

        let content = StreamReader::new(field.map_err(io::Error::other));
        let result = service
            .upload(&namespace, &file_path, content, credential.as_ref())
            .await?;
        return Ok(Json(UploadResponse::new(result.file_name)));
    }

    Err(RequestError::MissingFormFile(FORM_FILE_FIELD.to_string()).into())
}

/// Handles `GET /files/{namespace}/{*file_path}`.
///
/// The `Authorization` header carries the presented password. Range and
/// conditional headers are honoured once access is granted.
pub async fn download_file<B: ByteStore>(
    State(service): State<Arc<FileService<B>>>,
    Path((namespace, file_path)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, FileServerError> {
    let presented = Credential::from_header(headers.get(header::AUTHORIZATION));
    let result = service
        .download(&namespace, &file_path, presented.as_ref())
        .await?;

    serve_object(&headers, result.key.file_name(), result.object).await
}
