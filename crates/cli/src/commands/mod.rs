//! Command implementations.

pub mod account;
pub mod catalog;
pub mod shell;

use corner_shop_core::ProductId;
use corner_shop_storefront::services::AuthError;
use corner_shop_storefront::{AppError, AppState};
use thiserror::Error;

use crate::output;
use crate::validation::ValidationErrors;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The storefront failed or rejected the request.
    #[error(transparent)]
    App(#[from] AppError),

    /// Form input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// No product has this ID.
    #[error("No product with id {0}")]
    UnknownProduct(ProductId),

    /// The product cannot be added to the cart.
    #[error("{0} is out of stock")]
    OutOfStock(String),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AuthError> for CliError {
    fn from(err: AuthError) -> Self {
        Self::App(err.into())
    }
}

impl CliError {
    /// Whether this is a fault worth reporting rather than bad input.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        match self {
            Self::App(err) => !err.is_rejection(),
            Self::Io(_) => true,
            Self::Validation(_) | Self::UnknownProduct(_) | Self::OutOfStock(_) => false,
        }
    }

    /// Message to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::App(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Print every store notification as a toast line.
pub fn show_toasts(state: &AppState) {
    state.cart().subscribe(|event| {
        if let Some(notification) = event.notification() {
            print_line(&output::toast(&notification));
        }
    });
    state.auth().subscribe(|event| {
        if let Some(notification) = event.notification() {
            print_line(&output::toast(&notification));
        }
    });
}

#[allow(clippy::print_stdout)]
pub(crate) fn print(text: &str) {
    print!("{text}");
}

#[allow(clippy::print_stdout)]
pub(crate) fn print_line(text: &str) {
    println!("{text}");
}
