//! Login and signup form checks.
//!
//! Runs before the auth store is called so obviously bad input never costs
//! a round trip.

use std::fmt;

use corner_shop_core::Email;
use thiserror::Error;

const MIN_NAME_CHARS: usize = 2;
const MIN_PASSWORD_CHARS: usize = 6;

/// A form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

/// A single failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be at least 2 characters")]
    NameTooShort,
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid email address")]
    EmailInvalid,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Please confirm your password")]
    ConfirmationRequired,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl FieldError {
    /// The field this error belongs to.
    #[must_use]
    pub const fn field(self) -> Field {
        match self {
            Self::NameRequired | Self::NameTooShort => Field::Name,
            Self::EmailRequired | Self::EmailInvalid => Field::Email,
            Self::PasswordRequired | Self::PasswordTooShort => Field::Password,
            Self::ConfirmationRequired | Self::PasswordMismatch => Field::ConfirmPassword,
        }
    }
}

/// Every failed check on a form, at most one per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// The error for `field`, if it failed.
    #[must_use]
    pub fn for_field(&self, field: Field) -> Option<FieldError> {
        self.0.iter().copied().find(|e| e.field() == field)
    }

    fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Login form input.
#[derive(Debug, Clone, Copy)]
pub struct LoginForm<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl LoginForm<'_> {
    /// # Errors
    ///
    /// Returns every field that failed its check.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let errors = [check_email(self.email), check_password(self.password)]
            .into_iter()
            .flatten()
            .collect();
        ValidationErrors(errors).into_result()
    }
}

/// Signup form input.
#[derive(Debug, Clone, Copy)]
pub struct SignupForm<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

impl SignupForm<'_> {
    /// # Errors
    ///
    /// Returns every field that failed its check.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let errors = [
            check_name(self.name),
            check_email(self.email),
            check_password(self.password),
            check_confirmation(self.password, self.confirm_password),
        ]
        .into_iter()
        .flatten()
        .collect();
        ValidationErrors(errors).into_result()
    }

    /// The name as it should be stored.
    #[must_use]
    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }
}

fn check_name(name: &str) -> Option<FieldError> {
    let name = name.trim();
    if name.is_empty() {
        Some(FieldError::NameRequired)
    } else if name.chars().count() < MIN_NAME_CHARS {
        Some(FieldError::NameTooShort)
    } else {
        None
    }
}

fn check_email(email: &str) -> Option<FieldError> {
    if email.trim().is_empty() {
        Some(FieldError::EmailRequired)
    } else if Email::parse(email).is_err() {
        Some(FieldError::EmailInvalid)
    } else {
        None
    }
}

fn check_password(password: &str) -> Option<FieldError> {
    if password.is_empty() {
        Some(FieldError::PasswordRequired)
    } else if password.chars().count() < MIN_PASSWORD_CHARS {
        Some(FieldError::PasswordTooShort)
    } else {
        None
    }
}

fn check_confirmation(password: &str, confirmation: &str) -> Option<FieldError> {
    if confirmation.is_empty() {
        Some(FieldError::ConfirmationRequired)
    } else if password != confirmation {
        Some(FieldError::PasswordMismatch)
    } else {
        None
    }
}
