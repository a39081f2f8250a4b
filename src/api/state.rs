//! Application context shared by every handler.

use crate::auth::{Authenticator, SessionManager};

/// Built once at start-up and shared behind an `Arc`; nothing in it is mutated afterwards.
#[derive(Debug)]
pub struct AppContext {
    authenticator: Authenticator,
    sessions: SessionManager,
    dev_mode: bool,
}

impl AppContext {
    #[must_use]
    pub fn new(authenticator: Authenticator, sessions: SessionManager) -> Self {
        Self {
            authenticator,
            sessions,
            dev_mode: false,
        }
    }

    /// Development mode shows error details on 500 pages.
    #[must_use]
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    #[must_use]
    pub const fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    #[must_use]
    pub const fn dev_mode(&self) -> bool {
        self.dev_mode
    }
}
