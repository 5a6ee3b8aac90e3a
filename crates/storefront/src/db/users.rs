//! User directory repository.

use crate::models::UserRecord;
use crate::storage::{KeyValueStore, keys};

use super::RepositoryError;

/// Repository for the persisted user directory.
pub struct UserRepository<'a> {
    storage: &'a dyn KeyValueStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(storage: &'a dyn KeyValueStore) -> Self {
        Self { storage }
    }

    /// Load every user record, in signup order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    /// Returns `RepositoryError::DataCorruption` if the directory is not a valid list.
    pub fn all(&self) -> Result<Vec<UserRecord>, RepositoryError> {
        let Some(raw) = self.storage.get(keys::USERS)? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid user directory: {e}")))
    }

    /// Replace the stored directory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn save_all(&self, users: &[UserRecord]) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(users)?;
        self.storage.set(keys::USERS, &json)?;
        Ok(())
    }
}

/// Find the user whose email and credential both match.
#[must_use]
pub fn find_by_credentials<'u>(
    users: &'u [UserRecord],
    email: &str,
    password: &str,
) -> Option<&'u UserRecord> {
    users.iter().find(|u| u.matches(email, password))
}

/// Whether any user already has `email`.
#[must_use]
pub fn email_taken(users: &[UserRecord], email: &str) -> bool {
    users.iter().any(|u| u.email == email)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_missing_directory_is_empty() {
        let storage = MemoryStore::new();
        let repo = UserRepository::new(&storage);
        assert!(repo.all().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_preserves_order() {
        let storage = MemoryStore::new();
        let repo = UserRepository::new(&storage);
        let users = vec![
            UserRecord::new("A", "a@x.com", "secret1"),
            UserRecord::new("B", "b@x.com", "secret2"),
        ];
        repo.save_all(&users).unwrap();

        let loaded = repo.all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].email, "a@x.com");
        assert_eq!(loaded[1].email, "b@x.com");
    }

    #[test]
    fn test_corrupt_directory() {
        let storage = MemoryStore::new();
        storage.set(keys::USERS, "{not a list").unwrap();
        let repo = UserRepository::new(&storage);
        assert!(matches!(
            repo.all(),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_lookups() {
        let users = vec![UserRecord::new("A", "a@x.com", "secret1")];
        assert!(find_by_credentials(&users, "a@x.com", "secret1").is_some());
        assert!(find_by_credentials(&users, "a@x.com", "wrong").is_none());
        assert!(email_taken(&users, "a@x.com"));
        assert!(!email_taken(&users, "A@X.COM"));
    }
}
