//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// [`InvalidCredentials`](Self::InvalidCredentials) and
/// [`UserAlreadyExists`](Self::UserAlreadyExists) are ordinary outcomes the
/// caller renders as a message; everything else is a fault.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No user has this email and password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The email is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Storage failed underneath the store.
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Whether this is a business-rule rejection rather than a fault.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::UserAlreadyExists)
    }

    /// Message to show the user. Faults never expose their details.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid email or password",
            Self::UserAlreadyExists => "An account with this email already exists",
            Self::Repository(_) => "An error occurred. Please try again.",
        }
    }
}
