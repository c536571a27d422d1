//! Namespace store operations
//!
//! Durable, namespace-partitioned file content keyed by a relative path.
//! Keys are confined to their namespace when they are built, so this layer
//! addresses storage with them directly.

use log::{error, info, warn};
use tokio::io::AsyncRead;

use crate::error::StorageError;
use crate::storage::backend::ByteStore;
use crate::storage::key::StorageKey;
use crate::storage::results::{RetrieveResult, StoreResult};

#[derive(Debug)]
pub struct NamespaceStore<B> {
    backend: B,
}

impl<B: ByteStore> NamespaceStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Streams `content` to `key`, overwriting whatever was there.
    pub async fn put<R: AsyncRead + Send>(
        &self,
        key: &StorageKey,
        content: R,
    ) -> Result<StoreResult, StorageError> {
        let bytes_written = match self.backend.put_reader(key, content).await {
            Ok(n) => n,
            Err(e @ StorageError::UploadInterrupted(_)) => {
                warn!("Upload of {} interrupted: {}", key, e);
                return Err(e);
            }
            Err(e) => {
                error!("Failed to store file {}: {}", key, e);
                return Err(e);
            }
        };

        info!("Stored file {} ({} bytes)", key, bytes_written);

        Ok(StoreResult {
            key: key.clone(),
            bytes_written,
        })
    }

    /// Opens the content stored at `key`.
    pub async fn get(&self, key: &StorageKey) -> Result<RetrieveResult, StorageError> {
        match self.backend.open(key).await? {
            Some(object) => Ok(RetrieveResult {
                key: key.clone(),
                object,
            }),
            None => Err(StorageError::FileNotFound(key.to_string())),
        }
    }
}
