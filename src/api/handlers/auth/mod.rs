//! Auth handlers and supporting modules.
//!
//! Sign-in and sign-up proxy to the identity provider and store the returned
//! session secret in the `session` cookie. The session guard resolves that
//! cookie back into an account on every protected page load.
//!
//! ## Failure mapping
//!
//! - Malformed input is rejected with `400` before the provider is contacted.
//!   Sign-in always answers "Invalid email or password" so responses never
//!   reveal which emails are registered.
//! - Provider errors during sign-in/sign-up map to `401`, `409`, `400` or `502`.
//! - Provider errors during session lookup mean "not signed in".
//! - Logout always clears the cookie; remote deletion failures are only logged.

pub mod guard;
pub mod login;
pub mod register;
pub mod session;
mod state;
pub mod types;
mod utils;
pub mod validation;

pub use guard::{require_account, require_anonymous};
pub use session::current_account;
pub use state::{AuthConfig, AuthState};
pub use validation::PasswordPolicy;
