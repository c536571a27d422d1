//! Router construction

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::post;
use std::sync::Arc;

use crate::middleware::log_request;
use crate::protocol::handlers::{download_file, upload_file};
use crate::service::FileService;
use crate::storage::ByteStore;

pub const FILES_ROUTE: &str = "/files/{namespace}/{*file_path}";

/// Builds the HTTP router over `service`.
///
/// Upload size is not limited.
pub fn router<B: ByteStore>(service: Arc<FileService<B>>) -> Router {
    Router::new()
        .route(
            FILES_ROUTE,
            post(upload_file::<B>).get(download_file::<B>),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(log_request))
        .with_state(service)
}
