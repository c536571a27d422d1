//! Storage result types
//!
//! Defines result structures returned by storage operations.

use crate::storage::backend::StoredObject;
use crate::storage::key::StorageKey;

/// Result of a file storage operation
#[derive(Debug, Clone)]
pub struct StoreResult {
    pub key: StorageKey,
    pub bytes_written: u64,
}

/// Result of a file retrieval operation; the content is read from `object`
#[derive(Debug)]
pub struct RetrieveResult {
    pub key: StorageKey,
    pub object: StoredObject,
}
