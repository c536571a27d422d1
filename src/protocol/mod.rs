//! HTTP protocol layer
//!
//! Routes, request handlers, content serving and response bodies for the file endpoints.

pub mod handlers;
pub mod responses;
pub mod routes;
pub mod serve;

pub use responses::{ErrorResponse, UploadResponse};
pub use routes::router;
