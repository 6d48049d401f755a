//! Remote identity provider seam.
//!
//! The provider owns accounts, password hashing and sessions. This module only
//! describes the calls the gateway makes and the errors they can produce; the
//! REST implementation lives in [`appwrite`].

pub mod appwrite;

pub use appwrite::AppwriteClient;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Session id understood by the provider as "the session attached to this request".
pub const CURRENT_SESSION: &str = "current";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider rejected the credentials or session")]
    Unauthorized,
    #[error("account already exists: {0}")]
    Conflict(String),
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
    #[error("invalid identity provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

/// Session issued by the provider. Only the secret travels back to the browser.
#[derive(Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub secret: SecretString,
    pub expire: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("secret", &"***")
            .field("expire", &self.expire)
            .finish()
    }
}

/// Account as returned by the provider.
///
/// Only `$id`, `email` and `name` are read; every other field is kept verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Calls made against the remote identity provider.
///
/// Every method may fail; callers decide whether a failure is fatal for the
/// request or is treated as "not authenticated".
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a session from email and password, returning its secret.
    async fn create_email_password_session(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, IdentityError>;

    /// Create a new account.
    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<Account, IdentityError>;

    /// Delete the session identified by `session_id`, authenticated by `secret`.
    async fn delete_session(
        &self,
        secret: &SecretString,
        session_id: &str,
    ) -> Result<(), IdentityError>;

    /// Resolve the account owning the session `secret`.
    async fn get_account(&self, secret: &SecretString) -> Result<Account, IdentityError>;

    /// Lightweight reachability probe used by `/health`.
    async fn ping(&self) -> Result<(), IdentityError>;
}
