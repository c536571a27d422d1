//! Storage keys
//!
//! A `StorageKey` is a validated `(namespace, relative path)` pair. It is the
//! only way to address content or credentials, so every storage location is
//! confined to its namespace by construction.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::validation::{leaf_name, normalize_segments, validate_namespace};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    namespace: String,
    segments: Vec<String>,
}

impl StorageKey {
    /// Key for an upload: only the leaf file name of `path` is kept.
    pub fn for_upload(namespace: &str, path: &str) -> Result<Self, StorageError> {
        validate_namespace(namespace)?;
        Ok(Self {
            namespace: namespace.to_string(),
            segments: vec![leaf_name(path)?],
        })
    }

    /// Key for a download: the full normalized `path` is kept, so files in
    /// sub-directories of the namespace are addressable.
    pub fn for_download(namespace: &str, path: &str) -> Result<Self, StorageError> {
        validate_namespace(namespace)?;
        Ok(Self {
            namespace: namespace.to_string(),
            segments: normalize_segments(path)?,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Path relative to the namespace, `/`-joined
    pub fn relative_path(&self) -> String {
        self.segments.join("/")
    }

    /// Final segment of the key
    pub fn file_name(&self) -> &str {
        // both constructors guarantee at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Location of this key under a storage root: `root/<namespace>/<segments...>`
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.join(&self.namespace);
        path.extend(&self.segments);
        path
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.relative_path())
    }
}
