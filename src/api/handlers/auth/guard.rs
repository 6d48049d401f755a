//! Render-or-redirect decisions for pages.

use axum::response::Redirect;

use super::state::AuthConfig;
use crate::identity::Account;

/// Pages behind sign-in: anonymous visitors go to the sign-in page.
///
/// # Errors
/// Returns a redirect to the configured sign-in path when `account` is `None`.
pub fn require_account(account: Option<Account>, config: &AuthConfig) -> Result<Account, Redirect> {
    account.ok_or_else(|| Redirect::to(config.sign_in_path()))
}

/// Sign-in and sign-up pages: a live session goes back home.
///
/// # Errors
/// Returns a redirect to the configured home path when `account` is `Some`.
pub fn require_anonymous(account: Option<&Account>, config: &AuthConfig) -> Result<(), Redirect> {
    match account {
        Some(_) => Err(Redirect::to(config.home_path())),
        None => Ok(()),
    }
}
