//! Key-value persistence collaborator.
//!
//! The storefront keeps its durable state (the current session and the user
//! directory) in a flat string-to-string store that survives restarts, the
//! same shape as a browser's local storage.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - process-local map, clones share the same data
//! - [`FileStore`] - a single JSON object file on disk
//!
//! # Keys
//!
//! See [`keys`] for the keys used by the storefront.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the storage backend itself.
///
/// These are faults (storage unavailable or unreadable), not "no data":
/// a missing key is `Ok(None)`.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// The store could not be serialized for writing.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A durable string-to-string store.
///
/// Implementations must make each call atomic: a `set` is either fully
/// visible to the next `get` or not at all.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage keys used by the storefront.
pub mod keys {
    /// The current session (public user fields, JSON object).
    pub const SESSION: &str = "user";

    /// The user directory (JSON list of user records).
    pub const USERS: &str = "users";
}
