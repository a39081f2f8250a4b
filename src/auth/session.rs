//! Signed, time-bounded session cookie.
//!
//! State machine: Anonymous -> Authenticated (on `create`) -> Anonymous again on
//! logout (`destroy`) or once `expires_at` has passed. There is no server-side
//! registry: whatever the browser presents is re-verified on every request, and
//! anything that fails verification is treated as no session at all.

use axum::http::{header::InvalidHeaderValue, HeaderMap, HeaderValue};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    store::{Role, UserRecord},
    token::{self, TokenSigner, MIN_SECRET_LEN},
};

pub const SESSION_COOKIE_NAME: &str = "webgate_session";
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 60 * 60;
/// One year.
pub const MAX_SESSION_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;
const SESSION_PURPOSE: &str = "session";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session secret must be at least {} bytes", MIN_SECRET_LEN)]
    SecretTooShort,
    #[error("session ttl must be between 1 second and one year, got {0}")]
    InvalidTtl(i64),
    #[error("session expiry is out of range")]
    ExpiryOutOfRange,
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to sign session token")]
    Sign,
    #[error("invalid cookie value: {0}")]
    Cookie(#[from] InvalidHeaderValue),
}

/// An authenticated browser session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub login_ip: String,
    /// Unix seconds.
    pub issued_at: i64,
    /// Unix seconds; the session is valid strictly before this instant.
    pub expires_at: i64,
}

impl Session {
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() < self.expires_at
    }

    /// Login time in local time, `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn login_time(&self) -> String {
        Local
            .timestamp_opt(self.issued_at, 0)
            .single()
            .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    ttl_seconds: i64,
    cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_secure: false,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    #[must_use]
    pub const fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

#[derive(Debug)]
pub struct SessionManager {
    pub(super) signer: TokenSigner,
    config: SessionConfig,
}

impl SessionManager {
    /// # Errors
    /// Returns an error if the secret is too short or the ttl is out of range.
    pub fn new(secret: &[u8], config: SessionConfig) -> Result<Self, SessionError> {
        let signer = TokenSigner::new(secret).ok_or(SessionError::SecretTooShort)?;
        Self::with_signer(signer, config)
    }

    /// Key the manager with a random per-process secret. Restarting the process
    /// logs everybody out.
    ///
    /// # Errors
    /// Returns an error if the ttl is out of range.
    pub fn with_random_secret(config: SessionConfig) -> Result<Self, SessionError> {
        Self::with_signer(TokenSigner::random(), config)
    }

    fn with_signer(signer: TokenSigner, config: SessionConfig) -> Result<Self, SessionError> {
        if !(1..=MAX_SESSION_TTL_SECONDS).contains(&config.ttl_seconds) {
            return Err(SessionError::InvalidTtl(config.ttl_seconds));
        }
        Ok(Self { signer, config })
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start a session for `user` logged in from `ip`; returns the session and its token.
    ///
    /// # Errors
    /// Returns an error if the expiry overflows or the session cannot be
    /// serialized or signed.
    pub fn create(
        &self,
        user: &UserRecord,
        ip: &str,
        now: DateTime<Utc>,
    ) -> Result<(Session, String), SessionError> {
        let issued_at = now.timestamp();
        let expires_at = issued_at
            .checked_add(self.config.ttl_seconds)
            .ok_or(SessionError::ExpiryOutOfRange)?;
        let session = Session {
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            login_ip: ip.to_string(),
            issued_at,
            expires_at,
        };
        let payload = serde_json::to_vec(&session)?;
        let token = self
            .signer
            .sign(SESSION_PURPOSE, &payload)
            .ok_or(SessionError::Sign)?;
        Ok((session, token))
    }

    /// Decode a token presented at `now`. Expired, tampered and malformed tokens yield `None`.
    #[must_use]
    pub fn read(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let payload = self.signer.verify(SESSION_PURPOSE, token)?;
        let session: Session = serde_json::from_slice(&payload).ok()?;
        session.is_valid_at(now).then_some(session)
    }

    /// Resolve the session cookie carried by a request.
    #[must_use]
    pub fn from_headers(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Option<Session> {
        let token = token::cookie_value(headers, SESSION_COOKIE_NAME)?;
        self.read(&token, now)
    }

    #[must_use]
    pub fn is_authenticated(&self, headers: &HeaderMap, now: DateTime<Utc>) -> bool {
        self.from_headers(headers, now).is_some()
    }

    /// Persistent cookie carrying `token`, living as long as the session.
    ///
    /// # Errors
    /// Returns an error if the token is not a valid header value.
    pub fn session_cookie(&self, token: &str) -> Result<HeaderValue, SessionError> {
        Ok(token::set_cookie(
            SESSION_COOKIE_NAME,
            token,
            Some(self.config.ttl_seconds),
            self.config.cookie_secure,
        )?)
    }

    /// Cookie that ends the session in the browser.
    ///
    /// # Errors
    /// Returns an error if the cookie cannot be encoded as a header value.
    pub fn destroy(&self) -> Result<HeaderValue, SessionError> {
        Ok(token::clear_cookie(
            SESSION_COOKIE_NAME,
            self.config.cookie_secure,
        )?)
    }
}
