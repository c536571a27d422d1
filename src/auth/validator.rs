//! Access guard
//!
//! Keeps an optional password per storage key in a metadata store that is
//! separate from file content, and decides whether a presented password
//! grants read access.
//!
//! Per key the credential state only moves from "none" to "set"; setting it
//! again overwrites it in place, and nothing here removes it.

use log::{error, info, warn};

use super::credentials::{Credential, credentials_match};
use crate::error::{AccessError, StorageError};
use crate::storage::backend::ByteStore;
use crate::storage::key::StorageKey;

#[derive(Debug)]
pub struct AccessGuard<B> {
    metadata: B,
}

impl<B: ByteStore> AccessGuard<B> {
    pub fn new(metadata: B) -> Self {
        Self { metadata }
    }

    /// Checks `presented` against the credential recorded for `key`.
    ///
    /// A key with no recorded credential is open to everyone. A failure to
    /// read the recorded credential is returned as `AccessError::Lookup` and
    /// must be treated as a denial.
    pub async fn check_access(
        &self,
        key: &StorageKey,
        presented: Option<&Credential>,
    ) -> Result<(), AccessError> {
        let stored = match self.metadata.get(key).await {
            Ok(stored) => stored,
            Err(e) => {
                error!("Failed to read credential for {}: {}", key, e);
                return Err(AccessError::Lookup(e));
            }
        };

        match stored {
            None => Ok(()),
            Some(stored) if credentials_match(&stored, presented) => Ok(()),
            Some(_) => {
                warn!("Rejected credential for {}", key);
                Err(AccessError::Denied(key.to_string()))
            }
        }
    }

    /// Boolean form of `check_access`; lookup failures deny.
    pub async fn has_access(&self, key: &StorageKey, presented: Option<&Credential>) -> bool {
        self.check_access(key, presented).await.is_ok()
    }

    /// Records `credential` for `key`, replacing any previous one.
    pub async fn set_credential(
        &self,
        key: &StorageKey,
        credential: &Credential,
    ) -> Result<(), StorageError> {
        self.metadata.put(key, credential.as_bytes()).await?;
        info!("Password set for {}", key);
        Ok(())
    }
}
