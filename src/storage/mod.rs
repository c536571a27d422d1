//! File storage management
//!
//! Handles storage keys, path validation, byte backends and the namespace store.

pub mod backend;
pub mod filesystem;
pub mod key;
pub mod memory;
pub mod operations;
pub mod results;
pub mod validation;

pub use backend::{ByteStore, StoredObject};
pub use filesystem::DiskStore;
pub use key::StorageKey;
pub use memory::MemoryStore;
pub use operations::NamespaceStore;
