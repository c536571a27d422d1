//! Path validation
//!
//! Handles namespace and path validation and confinement checks. Every
//! caller-supplied name passes through here before it is turned into a
//! storage location.

use crate::error::StorageError;

const PARENT_SEGMENT: &str = "..";
const CURRENT_SEGMENT: &str = ".";

/// Characters that never appear in a stored name
fn has_forbidden_chars(input: &str) -> bool {
    input.contains(['\\', '\0'])
}

/// Validates a namespace name.
///
/// A namespace is a single directory level under each storage root, so it
/// must be a plain name: not empty, not `.` or `..`, no separators.
pub fn validate_namespace(namespace: &str) -> Result<(), StorageError> {
    if namespace.is_empty()
        || namespace == CURRENT_SEGMENT
        || namespace == PARENT_SEGMENT
        || namespace.contains('/')
        || has_forbidden_chars(namespace)
    {
        return Err(StorageError::InvalidNamespace(namespace.to_string()));
    }
    Ok(())
}

/// Splits a caller-supplied path into normalized segments.
///
/// Empty and `.` segments are dropped, so `a//./b/` becomes `["a", "b"]`.
/// A `..` segment anywhere is rejected rather than resolved, which keeps
/// every resolved location inside its namespace.
pub fn normalize_segments(path: &str) -> Result<Vec<String>, StorageError> {
    let mut segments = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | CURRENT_SEGMENT => continue,
            PARENT_SEGMENT => return Err(StorageError::PathTraversal(path.to_string())),
            s if has_forbidden_chars(s) => {
                return Err(StorageError::InvalidPath(path.to_string()));
            }
            s => segments.push(s.to_string()),
        }
    }

    if segments.is_empty() {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    Ok(segments)
}

/// Returns the final segment of a caller-supplied path (its leaf file name).
pub fn leaf_name(path: &str) -> Result<String, StorageError> {
    let mut segments = normalize_segments(path)?;
    // normalize_segments never returns an empty list
    segments
        .pop()
        .ok_or_else(|| StorageError::InvalidPath(path.to_string()))
}
