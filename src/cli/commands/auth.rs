use crate::api::handlers::auth::PasswordPolicy;
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, builder::ValueParser};

pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_PASSWORD_POLICY: &str = "password-policy";
pub const ARG_SIGN_IN_PATH: &str = "sign-in-path";
pub const ARG_HOME_PATH: &str = "home-path";

/// Session cookie, validation and redirect settings.
#[derive(Debug)]
pub struct Options {
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
    pub password_policy: PasswordPolicy,
    pub sign_in_path: String,
    pub home_path: String,
}

impl Options {
    /// # Errors
    /// Returns an error if a defaulted argument is unexpectedly missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .context("missing argument: --frontend-base-url")?;
        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .context("missing argument: --session-ttl-seconds")?;
        let password_policy = matches
            .get_one::<PasswordPolicy>(ARG_PASSWORD_POLICY)
            .copied()
            .unwrap_or_default();
        let sign_in_path = matches
            .get_one::<String>(ARG_SIGN_IN_PATH)
            .cloned()
            .context("missing argument: --sign-in-path")?;
        let home_path = matches
            .get_one::<String>(ARG_HOME_PATH)
            .cloned()
            .context("missing argument: --home-path")?;

        Ok(Self {
            frontend_base_url,
            session_ttl_seconds,
            password_policy,
            sign_in_path,
            home_path,
        })
    }
}

#[must_use]
pub fn validator_password_policy() -> ValueParser {
    ValueParser::from(|policy: &str| policy.parse::<PasswordPolicy>())
}

/// Redirect targets must be absolute paths on the frontend.
#[must_use]
pub fn validator_path() -> ValueParser {
    ValueParser::from(|path: &str| -> std::result::Result<String, String> {
        if path.starts_with('/') && !path.starts_with("//") {
            Ok(path.to_string())
        } else {
            Err(format!("path must start with a single '/': {path}"))
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL, used as the only allowed CORS origin")
                .env("ACCESSO_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("ACCESSO_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_PASSWORD_POLICY)
                .long(ARG_PASSWORD_POLICY)
                .help("Password policy for sign-in and sign-up: v1 (min 8 chars) or v2 (8-16 chars, upper, lower, digit, special)")
                .env("ACCESSO_PASSWORD_POLICY")
                .default_value("v1")
                .value_parser(validator_password_policy()),
        )
        .arg(
            Arg::new(ARG_SIGN_IN_PATH)
                .long(ARG_SIGN_IN_PATH)
                .help("Where anonymous visitors of protected pages are redirected")
                .env("ACCESSO_SIGN_IN_PATH")
                .default_value("/sign-in")
                .value_parser(validator_path()),
        )
        .arg(
            Arg::new(ARG_HOME_PATH)
                .long(ARG_HOME_PATH)
                .help("Where signed-in visitors of the sign-in and sign-up pages are redirected")
                .env("ACCESSO_HOME_PATH")
                .default_value("/")
                .value_parser(validator_path()),
        )
}
