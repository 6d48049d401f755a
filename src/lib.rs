//! # Accesso (session gateway)
//!
//! `accesso` sits between the sign-in/sign-up pages and a remote identity
//! provider. It validates credentials, creates and deletes provider sessions,
//! and carries the provider's session secret in an `HttpOnly` cookie.
//!
//! ## Sessions
//!
//! Nothing is persisted locally. The provider issues an opaque session secret
//! which is stored in the `session` cookie (`HttpOnly; Secure; SameSite=Strict`,
//! 30 days). Every protected page asks the provider who owns that secret; any
//! failure is treated as "not signed in".
//!
//! ## Credential validation
//!
//! Requests are checked against a single, versioned password policy before any
//! network call. Sign-in failures always answer with the same generic message so
//! the response never reveals which emails are registered.

pub mod api;
pub mod cli;
pub mod identity;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
