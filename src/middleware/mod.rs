//! Server middleware
//!
//! Provides request logging middleware.

pub mod logging;

pub use logging::log_request;
