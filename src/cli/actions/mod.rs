pub mod hash_password;
pub mod server;

use anyhow::Result;
use std::path::Path;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    HashPassword,
}

impl Action {
    /// Directory of the audit log; only the server writes one.
    #[must_use]
    pub fn audit_log_dir(&self) -> Option<&Path> {
        match self {
            Self::Server(args) => Some(args.log_dir.as_path()),
            Self::HashPassword => None,
        }
    }

    /// Run the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Server(args) => server::execute(args).await,
            Self::HashPassword => hash_password::execute(),
        }
    }
}
