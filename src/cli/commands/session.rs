use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;
use std::path::PathBuf;

use crate::auth::session::MAX_SESSION_TTL_SECONDS;

pub const ARG_USERS_FILE: &str = "users-file";
pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_TTL: &str = "session-ttl";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_USERS_FILE)
                .long("users-file")
                .help("JSON user table with Argon2id password hashes (default: built-in demo accounts)")
                .env("WEBGATE_USERS_FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long("session-secret")
                .help("Key signing session cookies, at least 32 bytes (default: random per process)")
                .env("WEBGATE_SESSION_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL)
                .long("session-ttl")
                .help("Session lifetime in seconds, at most one year")
                .env("WEBGATE_SESSION_TTL")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64).range(1..=MAX_SESSION_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long("cookie-secure")
                .help("Mark cookies Secure, for proxies terminating TLS")
                .env("WEBGATE_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}

pub struct Options {
    pub users_file: Option<PathBuf>,
    pub session_secret: Option<SecretString>,
    pub session_ttl_seconds: i64,
    pub cookie_secure: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if an argument with a default value is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            users_file: matches.get_one::<PathBuf>(ARG_USERS_FILE).cloned(),
            session_secret: matches
                .get_one::<String>(ARG_SESSION_SECRET)
                .map(|secret| SecretString::from(secret.clone())),
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL)
                .copied()
                .context("missing required argument: --session-ttl")?,
            cookie_secure: matches.get_flag(ARG_COOKIE_SECURE),
        })
    }
}
