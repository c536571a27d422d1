//! Error types
//!
//! Defines domain-specific error types for each module of the file server.

use std::fmt;
use std::io;

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    FileNotFound(String),
    InvalidNamespace(String),
    InvalidPath(String),
    PathTraversal(String),
    /// The content source failed before the whole upload was read
    UploadInterrupted(String),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::InvalidNamespace(n) => write!(f, "Invalid namespace: {}", n),
            StorageError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StorageError::PathTraversal(p) => write!(f, "Path traversal attempt: {}", p),
            StorageError::UploadInterrupted(msg) => write!(f, "Upload interrupted: {}", msg),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// Access guard errors
#[derive(Debug)]
pub enum AccessError {
    /// A credential is recorded for the key and the presented one does not match
    Denied(String),
    /// The recorded credential could not be read
    Lookup(StorageError),
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::Denied(key) => write!(f, "Access denied: {}", key),
            AccessError::Lookup(e) => write!(f, "Credential lookup failed: {}", e),
        }
    }
}

impl std::error::Error for AccessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccessError::Lookup(e) => Some(e),
            AccessError::Denied(_) => None,
        }
    }
}

/// Errors raised while reading an incoming request, before storage is touched
#[derive(Debug)]
pub enum RequestError {
    MissingFormFile(String),
    MalformedUpload(String),
    /// The requested byte range lies outside a file of this size
    RangeNotSatisfiable(u64),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingFormFile(field) => {
                write!(f, "Missing form file field: {}", field)
            }
            RequestError::MalformedUpload(msg) => write!(f, "Malformed upload: {}", msg),
            RequestError::RangeNotSatisfiable(size) => {
                write!(f, "Range not satisfiable for {} bytes", size)
            }
        }
    }
}

impl std::error::Error for RequestError {}

/// General file server error that encompasses all error types
#[derive(Debug)]
pub enum FileServerError {
    Storage(StorageError),
    Access(AccessError),
    Request(RequestError),
}

impl fmt::Display for FileServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileServerError::Storage(e) => write!(f, "Storage error: {}", e),
            FileServerError::Access(e) => write!(f, "Access error: {}", e),
            FileServerError::Request(e) => write!(f, "Request error: {}", e),
        }
    }
}

impl std::error::Error for FileServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileServerError::Storage(e) => Some(e),
            FileServerError::Access(e) => Some(e),
            FileServerError::Request(e) => Some(e),
        }
    }
}

// Implement conversions from specific errors to FileServerError
impl From<StorageError> for FileServerError {
    fn from(error: StorageError) -> Self {
        FileServerError::Storage(error)
    }
}

impl From<AccessError> for FileServerError {
    fn from(error: AccessError) -> Self {
        FileServerError::Access(error)
    }
}

impl From<RequestError> for FileServerError {
    fn from(error: RequestError) -> Self {
        FileServerError::Request(error)
    }
}

impl From<io::Error> for FileServerError {
    fn from(error: io::Error) -> Self {
        FileServerError::Storage(StorageError::IoError(error))
    }
}
