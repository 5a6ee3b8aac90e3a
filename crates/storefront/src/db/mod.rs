//! Repositories over the key-value persistence collaborator.
//!
//! # Entries
//!
//! - `users` - The user directory, a JSON list of [`UserRecord`](crate::models::UserRecord)
//! - `user` - The current [`Session`](crate::models::Session)
//!
//! Both entries are plain JSON with no schema version. Repositories surface
//! unreadable entries as [`RepositoryError::DataCorruption`] and leave the
//! recovery decision to the caller.

pub mod session;
pub mod users;

use thiserror::Error;

use crate::storage::StorageError;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A stored entry exists but cannot be parsed.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A value could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
