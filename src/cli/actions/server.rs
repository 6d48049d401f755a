use crate::{
    api::{
        self,
        handlers::auth::{AuthConfig, AuthState, PasswordPolicy},
    },
    identity::AppwriteClient,
};
use anyhow::Result;
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub identity_endpoint: String,
    pub identity_project: String,
    pub identity_api_key: SecretString,
    pub identity_timeout_seconds: u64,
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
    pub password_policy: PasswordPolicy,
    pub sign_in_path: String,
    pub home_path: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the identity client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let provider = AppwriteClient::new(
        &args.identity_endpoint,
        args.identity_project,
        args.identity_api_key,
        Duration::from_secs(args.identity_timeout_seconds),
    )?;

    info!(
        identity.endpoint = provider.endpoint(),
        password.policy = %args.password_policy,
        "Identity provider configured"
    );

    let auth_config = AuthConfig::new(args.frontend_base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_password_policy(args.password_policy)
        .with_sign_in_path(args.sign_in_path)
        .with_home_path(args.home_path);

    let auth_state = Arc::new(AuthState::new(auth_config, Arc::new(provider)));

    api::new(args.port, auth_state).await
}
