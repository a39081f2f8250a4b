use crate::{
    api::{self, AppContext},
    auth::{Authenticator, SessionConfig, SessionManager, StaticCredentialStore},
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info, warn};

pub struct Args {
    pub port: u16,
    pub dev: bool,
    pub log_dir: PathBuf,
    pub users_file: Option<PathBuf>,
    pub session_secret: Option<SecretString>,
    pub session_ttl_seconds: i64,
    pub cookie_secure: bool,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dev", &self.dev)
            .field("log_dir", &self.log_dir)
            .field("users_file", &self.users_file)
            .field(
                "session_secret",
                &self.session_secret.as_ref().map(|_| "***"),
            )
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// Build the application context from `args`.
/// # Errors
/// Returns an error if the users file is unusable or the session settings are invalid.
pub fn context(args: &Args) -> Result<AppContext> {
    let store = match &args.users_file {
        Some(path) => StaticCredentialStore::from_file(path)
            .with_context(|| format!("Failed to load users file {}", path.display()))?,
        None => {
            warn!("No users file configured, serving the built-in demonstration accounts");
            StaticCredentialStore::demo().context("Failed to hash demonstration accounts")?
        }
    };
    info!("Loaded {} user(s)", store.len());

    let authenticator = Authenticator::new(Arc::new(store))?;

    let config = SessionConfig::new()
        .with_ttl_seconds(args.session_ttl_seconds)
        .with_cookie_secure(args.cookie_secure);
    let sessions = match &args.session_secret {
        Some(secret) => SessionManager::new(secret.expose_secret().as_bytes(), config)
            .context("Invalid session secret")?,
        None => {
            debug!("No session secret configured, sessions end when the process restarts");
            SessionManager::with_random_secret(config).context("Invalid session settings")?
        }
    };

    if args.dev {
        warn!("Development mode: error details are shown on 500 pages");
    }

    Ok(AppContext::new(authenticator, sessions).with_dev_mode(args.dev))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the context cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let ctx = Arc::new(context(&args)?);

    api::new(args.port, ctx).await
}
