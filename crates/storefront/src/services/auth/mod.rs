//! Authentication store.
//!
//! A toy multi-user directory plus the single active session, both kept in
//! the key-value persistence collaborator so a restart restores the
//! signed-in user.
//!
//! # States
//!
//! - `Anonymous` - no session
//! - `Authenticated` - a [`Session`] is active and persisted
//!
//! Credentials are stored and compared in cleartext. This is a demo
//! directory; a real deployment must switch to salted password hashes.

mod error;

pub use error::AuthError;

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::instrument;

use crate::db::RepositoryError;
use crate::db::session::SessionRepository;
use crate::db::users::{UserRepository, email_taken, find_by_credentials};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{Session, UserRecord};
use crate::notify::{Notification, Observers, SubscriptionId};
use crate::storage::KeyValueStore;

/// Current authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(Session),
}

/// A session change, published after it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    LoggedIn(Session),
    SignedUp(Session),
    LoggedOut,
}

impl AuthEvent {
    /// The toast to show for this change.
    #[must_use]
    pub fn notification(&self) -> Option<Notification> {
        Some(match self {
            Self::LoggedIn(session) => {
                Notification::success(format!("Welcome back, {}!", session.name))
            }
            Self::SignedUp(session) => Notification::success(format!(
                "Welcome, {}! Your account has been created.",
                session.name
            )),
            Self::LoggedOut => Notification::info("You have been logged out"),
        })
    }
}

/// Authentication store.
///
/// Handles signup, login and logout against the persisted user directory.
pub struct AuthStore {
    storage: Arc<dyn KeyValueStore>,
    session: RwLock<Option<Session>>,
    // Held across each directory read-modify-write so concurrent callers
    // never observe a half-applied signup or login.
    directory: Mutex<()>,
    observers: Observers<AuthEvent>,
    latency: Duration,
}

impl AuthStore {
    /// Open the store and restore any persisted session.
    ///
    /// A persisted session that does not parse is removed and the store
    /// starts `Anonymous`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the storage backend fails.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Result<Self, AuthError> {
        let restored = restore_session(storage.as_ref())?;

        if let Some(session) = &restored {
            tracing::info!(user_id = %session.user_id, "session restored");
            set_sentry_user(&session.user_id, Some(&session.email));
        }

        Ok(Self {
            storage,
            session: RwLock::new(restored),
            directory: Mutex::new(()),
            observers: Observers::new(),
            latency: Duration::ZERO,
        })
    }

    /// Delay `login` and `signup` by `latency`, imitating a remote call.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.session()
            .map_or(AuthState::Anonymous, AuthState::Authenticated)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Log in with an exact, case-sensitive email and password match.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no user matches; the
    /// current state is left untouched.
    /// Returns `AuthError::Repository` if storage fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.simulate_latency().await;

        let session = {
            let _directory = self.directory.lock().await;
            let users = self.load_directory()?;
            let user = find_by_credentials(&users, email, password).ok_or_else(|| {
                tracing::info!("login rejected");
                AuthError::InvalidCredentials
            })?;
            let session = user.to_session();
            self.activate(session.clone())?;
            session
        };

        tracing::info!(user_id = %session.user_id, "logged in");
        self.observers.publish(&AuthEvent::LoggedIn(session.clone()));
        Ok(session)
    }

    /// Create an account and log into it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is registered;
    /// neither the directory nor the session changes.
    /// Returns `AuthError::Repository` if storage fails; the new record is
    /// removed again if the session cannot be saved.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        self.simulate_latency().await;

        let session = {
            let _directory = self.directory.lock().await;
            let mut users = self.load_directory()?;
            if email_taken(&users, email) {
                tracing::info!("signup rejected: email already registered");
                return Err(AuthError::UserAlreadyExists);
            }

            let user = UserRecord::new(name, email, password);
            let session = user.to_session();
            users.push(user);
            let directory = UserRepository::new(self.storage.as_ref());
            directory.save_all(&users)?;
            if let Err(e) = self.activate(session.clone()) {
                users.pop();
                if let Err(rollback) = directory.save_all(&users) {
                    tracing::error!(error = %rollback, "failed to roll back new user");
                }
                return Err(e);
            }
            session
        };

        tracing::info!(user_id = %session.user_id, "account created");
        self.observers.publish(&AuthEvent::SignedUp(session.clone()));
        Ok(session)
    }

    /// End the session.
    ///
    /// The in-memory session is always cleared and `LoggedOut` published,
    /// even when removing the persisted entry fails.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the persisted entry cannot be removed.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), AuthError> {
        let (previous, cleared) = {
            let mut slot = self.write_session();
            let previous = slot.take();
            (previous, SessionRepository::new(self.storage.as_ref()).clear())
        };

        if let Some(session) = previous {
            tracing::info!(user_id = %session.user_id, "logged out");
            clear_sentry_user();
            self.observers.publish(&AuthEvent::LoggedOut);
        }
        cleared.map_err(AuthError::from)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Observe session changes. Observers run in registration order.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Read the directory, treating an unreadable one as empty.
    fn load_directory(&self) -> Result<Vec<UserRecord>, AuthError> {
        match UserRepository::new(self.storage.as_ref()).all() {
            Ok(users) => Ok(users),
            Err(RepositoryError::DataCorruption(reason)) => {
                tracing::warn!(%reason, "ignoring unreadable user directory");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `session` and make it current in one step.
    fn activate(&self, session: Session) -> Result<(), AuthError> {
        let mut slot = self.write_session();
        SessionRepository::new(self.storage.as_ref()).save(&session)?;
        set_sentry_user(&session.user_id, Some(&session.email));
        *slot = Some(session);
        Ok(())
    }

    fn write_session(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("session", &self.session())
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

/// Load the persisted session, discarding an unreadable entry.
fn restore_session(storage: &dyn KeyValueStore) -> Result<Option<Session>, AuthError> {
    let sessions = SessionRepository::new(storage);
    match sessions.load() {
        Ok(session) => Ok(session),
        Err(RepositoryError::DataCorruption(reason)) => {
            tracing::warn!(%reason, "discarding unreadable stored session");
            sessions.clear()?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::storage::{MemoryStore, keys};

    fn open(storage: &MemoryStore) -> AuthStore {
        AuthStore::open(Arc::new(storage.clone())).unwrap()
    }

    fn directory_len(storage: &MemoryStore) -> usize {
        UserRepository::new(storage).all().unwrap().len()
    }

    #[tokio::test]
    async fn test_signup_logs_in_and_persists() {
        let storage = MemoryStore::new();
        let auth = open(&storage);
        assert_eq!(auth.state(), AuthState::Anonymous);

        let session = auth.signup("A", "a@x.com", "secret1").await.unwrap();
        assert_eq!(session.name, "A");
        assert_eq!(session.email, "a@x.com");
        assert!(session.user_id.as_str().starts_with("user_"));
        assert_eq!(auth.state(), AuthState::Authenticated(session.clone()));

        assert_eq!(directory_len(&storage), 1);
        let persisted = SessionRepository::new(&storage).load().unwrap();
        assert_eq!(persisted, Some(session));
    }

    #[tokio::test]
    async fn test_duplicate_signup_changes_nothing() {
        let storage = MemoryStore::new();
        let auth = open(&storage);
        let first = auth.signup("A", "a@x.com", "secret1").await.unwrap();
        let directory_before = storage.get(keys::USERS).unwrap();

        let err = auth.signup("Other", "a@x.com", "different").await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
        assert_eq!(storage.get(keys::USERS).unwrap(), directory_before);
        assert_eq!(auth.session(), Some(first));
    }

    #[tokio::test]
    async fn test_emails_are_case_sensitive() {
        let storage = MemoryStore::new();
        let auth = open(&storage);
        auth.signup("A", "a@x.com", "secret1").await.unwrap();
        auth.signup("Big A", "A@x.com", "secret1").await.unwrap();
        assert_eq!(directory_len(&storage), 2);
    }

    #[tokio::test]
    async fn test_login_wrong_password_stays_anonymous() {
        let storage = MemoryStore::new();
        let auth = open(&storage);
        auth.signup("A", "a@x.com", "secret1").await.unwrap();
        auth.logout().unwrap();

        let err = auth.login("a@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(err.is_rejection());
        assert_eq!(auth.state(), AuthState::Anonymous);
        assert_eq!(storage.get(keys::SESSION).unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let storage = MemoryStore::new();
        let auth = open(&storage);
        let session = auth.signup("A", "a@x.com", "secret1").await.unwrap();

        assert!(auth.login("nobody@x.com", "secret1").await.is_err());
        assert_eq!(auth.session(), Some(session));
    }

    #[tokio::test]
    async fn test_signup_logout_login_round_trip() {
        let storage = MemoryStore::new();
        let auth = open(&storage);
        let created = auth.signup("A", "a@x.com", "secret1").await.unwrap();
        auth.logout().unwrap();
        assert!(!auth.is_authenticated());

        let session = auth.login("a@x.com", "secret1").await.unwrap();
        assert_eq!(session.name, "A");
        assert_eq!(session.email, "a@x.com");
        assert_eq!(session.user_id, created.user_id);
    }

    #[tokio::test]
    async fn test_logout_when_anonymous_is_noop() {
        let storage = MemoryStore::new();
        let auth = open(&storage);
        let events = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        auth.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        auth.logout().unwrap();
        auth.logout().unwrap();
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_restores_persisted_session() {
        let storage = MemoryStore::new();
        storage
            .set(keys::SESSION, r#"{"id":"user_1","name":"A","email":"a@x.com"}"#)
            .unwrap();

        let auth = open(&storage);
        let session = auth.session().unwrap();
        assert_eq!(session.user_id.as_str(), "user_1");
        assert_eq!(session.name, "A");
    }

    #[test]
    fn test_malformed_session_is_discarded() {
        let storage = MemoryStore::new();
        storage.set(keys::SESSION, "{\"id\":").unwrap();

        let auth = open(&storage);
        assert_eq!(auth.state(), AuthState::Anonymous);
        assert_eq!(storage.get(keys::SESSION).unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreadable_directory_is_treated_as_empty() {
        let storage = MemoryStore::new();
        storage.set(keys::USERS, "garbage").unwrap();
        let auth = open(&storage);

        assert!(matches!(
            auth.login("a@x.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        ));
        auth.signup("A", "a@x.com", "secret1").await.unwrap();
        assert_eq!(directory_len(&storage), 1);
    }

    #[tokio::test]
    async fn test_events_in_order() {
        let storage = MemoryStore::new();
        let auth = open(&storage);
        let events = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        auth.subscribe(move |e: &AuthEvent| sink.lock().unwrap().push(e.clone()));

        let created = auth.signup("A", "a@x.com", "secret1").await.unwrap();
        auth.logout().unwrap();
        let _ = auth.login("a@x.com", "nope").await;
        let restored = auth.login("a@x.com", "secret1").await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                AuthEvent::SignedUp(created),
                AuthEvent::LoggedOut,
                AuthEvent::LoggedIn(restored),
            ]
        );
        assert_eq!(
            events[0].notification().unwrap().message,
            "Welcome, A! Your account has been created."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let storage = MemoryStore::new();
        let auth = open(&storage).with_latency(Duration::from_millis(500));

        let started = tokio::time::Instant::now();
        auth.signup("A", "a@x.com", "secret1").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
