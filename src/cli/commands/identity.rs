use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_IDENTITY_ENDPOINT: &str = "identity-endpoint";
pub const ARG_IDENTITY_PROJECT: &str = "identity-project";
pub const ARG_IDENTITY_API_KEY: &str = "identity-api-key";
pub const ARG_IDENTITY_TIMEOUT_SECONDS: &str = "identity-timeout-seconds";

/// Identity provider connection settings.
#[derive(Debug)]
pub struct Options {
    pub endpoint: String,
    pub project: String,
    pub api_key: SecretString,
    pub timeout_seconds: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if a required identity argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let endpoint = matches
            .get_one::<String>(ARG_IDENTITY_ENDPOINT)
            .cloned()
            .context("missing required argument: --identity-endpoint")?;
        let project = matches
            .get_one::<String>(ARG_IDENTITY_PROJECT)
            .cloned()
            .context("missing required argument: --identity-project")?;
        let api_key = matches
            .get_one::<String>(ARG_IDENTITY_API_KEY)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --identity-api-key")?;
        let timeout_seconds = matches
            .get_one::<u64>(ARG_IDENTITY_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(10);

        Ok(Self {
            endpoint,
            project,
            api_key,
            timeout_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDENTITY_ENDPOINT)
                .long(ARG_IDENTITY_ENDPOINT)
                .help("Identity provider API endpoint, example: https://cloud.appwrite.io/v1")
                .env("ACCESSO_IDENTITY_ENDPOINT")
                .required(true),
        )
        .arg(
            Arg::new(ARG_IDENTITY_PROJECT)
                .long(ARG_IDENTITY_PROJECT)
                .help("Identity provider project id")
                .env("ACCESSO_IDENTITY_PROJECT")
                .required(true),
        )
        .arg(
            Arg::new(ARG_IDENTITY_API_KEY)
                .long(ARG_IDENTITY_API_KEY)
                .help("Identity provider server API key (needs the sessions.write scope)")
                .env("ACCESSO_IDENTITY_API_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_IDENTITY_TIMEOUT_SECONDS)
                .long(ARG_IDENTITY_TIMEOUT_SECONDS)
                .help("Timeout in seconds for identity provider requests")
                .env("ACCESSO_IDENTITY_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
