//! Key-value store used to persist cache entries and recent searches
//!
//! The search core only needs `get` and `set` of JSON text under string keys.
//! `FileStore` keeps one file per key on disk; `MemoryStore` keeps everything
//! in memory and can simulate an unavailable backend.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::future::Future;

use thiserror::Error;

/// Errors reported by a key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing files failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded before writing
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// A stored file does not have the expected layout
    #[error("Corrupt store entry {0}")]
    Corrupt(String),

    /// The backend refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persisted string-keyed storage of JSON text
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if there is none
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>>;
}
