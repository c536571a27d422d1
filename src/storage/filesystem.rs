//! File system backend
//!
//! Stores each key as a regular file at `root/<namespace>/<path>`.

use log::{debug, error, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::pin;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::error::StorageError;
use crate::storage::backend::{ByteStore, StoredObject};
use crate::storage::key::StorageKey;

const BUFFER_SIZE: usize = 8192;

/// Distinguishes temporary files of concurrent writes to the same key
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Sibling of `path` used while its new content is being written.
    /// Its length does not depend on the target's name.
    fn temp_path(path: &Path) -> PathBuf {
        let id = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        path.with_file_name(format!(".{}-{}.tmp", process::id(), id))
    }

    /// Copy `reader` into a fresh file at `temp_path`, returning the byte count
    async fn write_temp<R: AsyncRead + Send>(
        temp_path: &Path,
        reader: R,
    ) -> Result<u64, StorageError> {
        let mut reader = pin!(reader);
        let mut file = File::create(temp_path).await?;
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut total: u64 = 0;

        loop {
            let n = match reader.read(&mut buffer).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    warn!("Upload source failed after {} bytes: {}", total, e);
                    return Err(StorageError::UploadInterrupted(e.to_string()));
                }
            };
            file.write_all(&buffer[..n]).await?;
            total += n as u64;
        }

        file.flush().await?;
        Ok(total)
    }
}

/// Check if a read error means "nothing stored at this key"
fn is_missing(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::NotFound | ErrorKind::NotADirectory)
}

impl ByteStore for DiskStore {
    async fn put_reader<R: AsyncRead + Send>(
        &self,
        key: &StorageKey,
        reader: R,
    ) -> Result<u64, StorageError> {
        let path = key.to_path(&self.root);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                error!("Failed to create directory {}: {}", parent.display(), e);
                StorageError::from(e)
            })?;
        }

        // Write to a temporary file first, then rename over the final name,
        // so readers see either the old or the new content
        let temp_path = Self::temp_path(&path);
        let written = match Self::write_temp(&temp_path, reader).await {
            Ok(written) => written,
            Err(e) => {
                if let StorageError::IoError(io) = &e {
                    error!("Failed to write temporary file {}: {}", temp_path.display(), io);
                }
                let _ = fs::remove_file(&temp_path).await;
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&temp_path, &path).await {
            error!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            );
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::from(e));
        }

        debug!("Wrote {} bytes to {}", written, path.display());
        Ok(written)
    }

    async fn open(&self, key: &StorageKey) -> Result<Option<StoredObject>, StorageError> {
        let path = key.to_path(&self.root);

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            // directories are containers, never stored entries
            Ok(_) => return Ok(None),
            Err(e) if is_missing(e.kind()) => return Ok(None),
            Err(e) => return Err(StorageError::from(e)),
        };

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if is_missing(e.kind()) => return Ok(None),
            Err(e) => return Err(StorageError::from(e)),
        };

        Ok(Some(StoredObject {
            len: metadata.len(),
            modified: metadata.modified().ok(),
            reader: Box::new(file),
        }))
    }
}
