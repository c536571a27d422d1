//! Credential values and comparison
//!
//! Passwords are raw byte strings taken verbatim from the `Authorization`
//! header. They are stored and compared as-is.

use axum::http::HeaderValue;
use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Vec<u8>);

impl Credential {
    /// Returns `None` for an empty password, which never gates a file.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Option<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() { None } else { Some(Self(bytes)) }
    }

    /// Credential carried by an `Authorization` header, if any
    pub fn from_header(value: Option<&HeaderValue>) -> Option<Self> {
        value.and_then(|v| Self::new(v.as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} bytes redacted>)", self.0.len())
    }
}

/// Decides whether a presented credential satisfies a stored one.
///
/// Exact byte-for-byte equality. A missing presented credential compares as
/// the empty string. All access decisions go through this function.
// TODO: switch to a constant-time comparison; stored passwords are plaintext
pub fn credentials_match(stored: &[u8], presented: Option<&Credential>) -> bool {
    let presented = presented.map(Credential::as_bytes).unwrap_or_default();
    stored == presented
}
