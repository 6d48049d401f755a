//! Map parsed CLI arguments to an [`Action`].

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, auth, identity};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let identity_opts = identity::Options::parse(matches)?;
    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        identity_endpoint: identity_opts.endpoint,
        identity_project: identity_opts.project,
        identity_api_key: identity_opts.api_key,
        identity_timeout_seconds: identity_opts.timeout_seconds,
        frontend_base_url: auth_opts.frontend_base_url,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        password_policy: auth_opts.password_policy,
        sign_in_path: auth_opts.sign_in_path,
        home_path: auth_opts.home_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::PasswordPolicy;
    use secrecy::ExposeSecret;

    #[test]
    fn handler_builds_server_args() {
        temp_env::with_vars(
            [
                ("ACCESSO_IDENTITY_ENDPOINT", Some("https://id.accesso.dev/v1")),
                ("ACCESSO_IDENTITY_PROJECT", Some("accesso")),
                ("ACCESSO_IDENTITY_API_KEY", Some("secret-key")),
                ("ACCESSO_IDENTITY_TIMEOUT_SECONDS", None),
                ("ACCESSO_PORT", None),
                ("ACCESSO_FRONTEND_BASE_URL", Some("https://app.accesso.dev")),
                ("ACCESSO_SESSION_TTL_SECONDS", Some("3600")),
                ("ACCESSO_PASSWORD_POLICY", Some("strict")),
                ("ACCESSO_SIGN_IN_PATH", None),
                ("ACCESSO_HOME_PATH", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["accesso"]);
                let action = handler(&matches);
                assert!(action.is_ok());
                let Ok(Action::Server(args)) = action else {
                    return;
                };

                assert_eq!(args.port, 8080);
                assert_eq!(args.identity_endpoint, "https://id.accesso.dev/v1");
                assert_eq!(args.identity_project, "accesso");
                assert_eq!(args.identity_api_key.expose_secret(), "secret-key");
                assert_eq!(args.identity_timeout_seconds, 10);
                assert_eq!(args.frontend_base_url, "https://app.accesso.dev");
                assert_eq!(args.session_ttl_seconds, 3600);
                assert_eq!(args.password_policy, PasswordPolicy::V2);
                assert_eq!(args.sign_in_path, "/sign-in");
                assert_eq!(args.home_path, "/");
            },
        );
    }
}
