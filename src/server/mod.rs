//! Server core functionality
//!
//! This module contains the listener setup, serve loop and shutdown handling
//! for the file server.

pub mod core;

pub use core::Server;
