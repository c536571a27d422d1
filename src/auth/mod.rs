//! Access control
//!
//! Handles per-file passwords: credential values, comparison, and the
//! access guard that records and checks them.

pub mod credentials;
pub mod validator;

pub use credentials::{Credential, credentials_match};
pub use validator::AccessGuard;
