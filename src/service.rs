//! File service
//!
//! Composes the namespace store and the access guard into the two
//! operations the HTTP layer exposes.
//!
//! Uploads store content under the leaf name of the requested path and then,
//! if a password was supplied, record it for the same key. The two writes are
//! not atomic: a download racing an upload can see new content under the old
//! password. An upload without a password leaves an existing one in place.
//!
//! Downloads check the password against the full requested path before any
//! content is read.

use log::info;
use tokio::io::AsyncRead;

use crate::auth::{AccessGuard, Credential};
use crate::error::FileServerError;
use crate::storage::{ByteStore, NamespaceStore, StorageKey, StoredObject};

/// Result of an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Leaf name the content was stored under
    pub file_name: String,
    pub bytes_written: u64,
    pub password_set: bool,
}

/// Result of a download; the content is streamed from `object`
#[derive(Debug)]
pub struct DownloadResult {
    pub key: StorageKey,
    pub object: StoredObject,
}

#[derive(Debug)]
pub struct FileService<B> {
    store: NamespaceStore<B>,
    guard: AccessGuard<B>,
}

impl<B: ByteStore> FileService<B> {
    /// `content` holds file bytes; `metadata` holds passwords at the same keys.
    pub fn new(content: B, metadata: B) -> Self {
        Self {
            store: NamespaceStore::new(content),
            guard: AccessGuard::new(metadata),
        }
    }

    pub fn store(&self) -> &NamespaceStore<B> {
        &self.store
    }

    pub async fn upload<R: AsyncRead + Send>(
        &self,
        namespace: &str,
        file_path: &str,
        content: R,
        credential: Option<&Credential>,
    ) -> Result<UploadResult, FileServerError> {
        let key = StorageKey::for_upload(namespace, file_path)?;

        info!("Creating file {}", key);
        let stored = self.store.put(&key, content).await?;

        if let Some(credential) = credential {
            self.guard.set_credential(&key, credential).await?;
        }

        Ok(UploadResult {
            file_name: key.file_name().to_string(),
            bytes_written: stored.bytes_written,
            password_set: credential.is_some(),
        })
    }

    pub async fn download(
        &self,
        namespace: &str,
        file_path: &str,
        presented: Option<&Credential>,
    ) -> Result<DownloadResult, FileServerError> {
        let key = StorageKey::for_download(namespace, file_path)?;

        self.guard.check_access(&key, presented).await?;

        let retrieved = self.store.get(&key).await?;
        Ok(DownloadResult {
            key: retrieved.key,
            object: retrieved.object,
        })
    }
}
