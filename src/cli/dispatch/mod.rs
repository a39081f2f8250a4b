//! Map validated CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{self, logging, session};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if matches.subcommand_name() == Some(commands::CMD_HASH_PASSWORD) {
        return Ok(Action::HashPassword);
    }

    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(5000);
    let log_dir = matches
        .get_one::<PathBuf>(logging::ARG_LOG_DIR)
        .cloned()
        .context("missing required argument: --log-dir")?;
    let session_opts = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dev: matches.get_flag(commands::ARG_DEV),
        log_dir,
        users_file: session_opts.users_file,
        session_secret: session_opts.session_secret,
        session_ttl_seconds: session_opts.session_ttl_seconds,
        cookie_secure: session_opts.cookie_secure,
    }))
}
