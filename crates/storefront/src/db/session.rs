//! Current-session repository.

use crate::models::Session;
use crate::storage::{KeyValueStore, keys};

use super::RepositoryError;

/// Repository for the persisted session entry.
pub struct SessionRepository<'a> {
    storage: &'a dyn KeyValueStore,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(storage: &'a dyn KeyValueStore) -> Self {
        Self { storage }
    }

    /// Load the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    /// Returns `RepositoryError::DataCorruption` if the entry does not parse.
    pub fn load(&self) -> Result<Option<Session>, RepositoryError> {
        let Some(raw) = self.storage.get(keys::SESSION)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid stored session: {e}")))
    }

    /// Persist `session`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn save(&self, session: &Session) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(session)?;
        self.storage.set(keys::SESSION, &json)?;
        Ok(())
    }

    /// Remove the persisted session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the backend fails.
    pub fn clear(&self) -> Result<(), RepositoryError> {
        self.storage.remove(keys::SESSION)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use corner_shop_core::UserId;

    fn session() -> Session {
        Session {
            user_id: UserId::new("user_1"),
            name: "A".to_owned(),
            email: "a@x.com".to_owned(),
        }
    }

    #[test]
    fn test_save_load_clear() {
        let storage = MemoryStore::new();
        let repo = SessionRepository::new(&storage);
        assert_eq!(repo.load().unwrap(), None);

        repo.save(&session()).unwrap();
        assert_eq!(repo.load().unwrap(), Some(session()));
        assert_eq!(
            storage.get(keys::SESSION).unwrap().as_deref(),
            Some(r#"{"id":"user_1","name":"A","email":"a@x.com"}"#)
        );

        repo.clear().unwrap();
        assert_eq!(repo.load().unwrap(), None);
    }

    #[test]
    fn test_malformed_entry() {
        let storage = MemoryStore::new();
        storage.set(keys::SESSION, "{\"id\": 42").unwrap();
        let repo = SessionRepository::new(&storage);
        assert!(matches!(
            repo.load(),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
