//! Byte storage backends
//!
//! The namespace store and the access guard both persist raw bytes under a
//! `StorageKey`. They do so through `ByteStore`, so the on-disk trees can be
//! swapped for an in-memory map in tests.
//!
//! File content moves through the streaming half of the trait (`put_reader`,
//! `open`) and is never buffered whole. Credentials are tiny and use the
//! buffered `put`/`get`, which are built on the streaming methods.

use std::fmt;
use std::future::Future;
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek};

use crate::error::StorageError;
use crate::storage::key::StorageKey;

/// Readable, seekable handle on stored content
pub trait ObjectReader: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> ObjectReader for T {}

/// An opened entry: its size, modification time and a reader positioned at 0
pub struct StoredObject {
    pub len: u64,
    pub modified: Option<SystemTime>,
    pub reader: Box<dyn ObjectReader>,
}

impl StoredObject {
    /// Reads the whole entry into memory.
    pub async fn read_to_vec(mut self) -> Result<Vec<u8>, StorageError> {
        let mut bytes = Vec::with_capacity(usize::try_from(self.len).unwrap_or_default());
        self.reader.read_to_end(&mut bytes).await?;
        Ok(bytes)
    }
}

impl fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("len", &self.len)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

pub trait ByteStore: Send + Sync + 'static {
    /// Writes everything `reader` yields at `key`, creating any missing
    /// intermediate containers and replacing existing content. Returns the
    /// number of bytes written.
    ///
    /// A failure while reading from `reader` is `StorageError::UploadInterrupted`
    /// and leaves the previous content in place.
    fn put_reader<R: AsyncRead + Send>(
        &self,
        key: &StorageKey,
        reader: R,
    ) -> impl Future<Output = Result<u64, StorageError>> + Send;

    /// Opens the entry stored at `key`, or `None` if nothing is stored there.
    fn open(
        &self,
        key: &StorageKey,
    ) -> impl Future<Output = Result<Option<StoredObject>, StorageError>> + Send;

    /// Buffered form of `put_reader`.
    fn put(
        &self,
        key: &StorageKey,
        bytes: &[u8],
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        async move { self.put_reader(key, bytes).await.map(|_| ()) }
    }

    /// Buffered form of `open`.
    fn get(
        &self,
        key: &StorageKey,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send {
        async move {
            match self.open(key).await? {
                Some(object) => object.read_to_vec().await.map(Some),
                None => Ok(None),
            }
        }
    }
}
