//! In-memory backend, used by tests and embedders that do not want to touch disk.

use std::collections::HashMap;
use std::io::Cursor;
use std::pin::pin;
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::storage::backend::{ByteStore, StoredObject};
use crate::storage::key::StorageKey;

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    modified: SystemTime,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<StorageKey, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl ByteStore for MemoryStore {
    async fn put_reader<R: AsyncRead + Send>(
        &self,
        key: &StorageKey,
        reader: R,
    ) -> Result<u64, StorageError> {
        let mut reader = pin!(reader);
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| StorageError::UploadInterrupted(e.to_string()))?;

        let written = bytes.len() as u64;
        let entry = Entry {
            bytes,
            modified: SystemTime::now(),
        };
        self.entries.write().await.insert(key.clone(), entry);
        Ok(written)
    }

    async fn open(&self, key: &StorageKey) -> Result<Option<StoredObject>, StorageError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).map(|entry| StoredObject {
            len: entry.bytes.len() as u64,
            modified: Some(entry.modified),
            reader: Box::new(Cursor::new(entry.bytes.clone())),
        }))
    }
}
