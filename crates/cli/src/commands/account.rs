//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! shop signup -n "Ada Lovelace" -e ada@example.com -p secret1
//! shop login -e ada@example.com -p secret1
//! shop whoami
//! shop logout
//! ```
//!
//! The session is kept in `STOREFRONT_DATA_DIR`, so it survives between
//! invocations.

use corner_shop_storefront::models::Session;
use corner_shop_storefront::services::AuthStore;

use super::{CliError, print};
use crate::output;
use crate::validation::{LoginForm, SignupForm};

/// Validate the form, then create the account and log in.
///
/// # Errors
///
/// Returns `CliError::Validation` for bad input, otherwise whatever the
/// auth store reports.
pub async fn signup(auth: &AuthStore, form: SignupForm<'_>) -> Result<Session, CliError> {
    form.validate()?;
    Ok(auth
        .signup(form.trimmed_name(), form.email, form.password)
        .await?)
}

/// Validate the form, then log in.
///
/// # Errors
///
/// Returns `CliError::Validation` for bad input, otherwise whatever the
/// auth store reports.
pub async fn login(auth: &AuthStore, form: LoginForm<'_>) -> Result<Session, CliError> {
    form.validate()?;
    Ok(auth.login(form.email, form.password).await?)
}

/// End the current session.
///
/// # Errors
///
/// Returns an error if the stored session cannot be removed.
pub fn logout(auth: &AuthStore) -> Result<(), CliError> {
    if !auth.is_authenticated() {
        print("Not logged in\n");
    }
    auth.logout()?;
    Ok(())
}

/// Print the signed-in user.
pub fn whoami(auth: &AuthStore) {
    print(&output::session(auth.session().as_ref()));
}
