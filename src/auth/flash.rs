//! One-shot flash messages carried across a redirect in a signed cookie.
//!
//! Queueing sets the cookie; the next page that renders messages reads them
//! and clears the cookie in the same response.

use axum::http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{
    session::{SessionError, SessionManager},
    token,
};

pub const FLASH_COOKIE_NAME: &str = "webgate_flash";
const FLASH_PURPOSE: &str = "flash";

#[derive(Debug, Default, Serialize, Deserialize)]
struct FlashPayload {
    messages: Vec<String>,
}

impl SessionManager {
    /// Pending messages in the request, oldest first. Invalid cookies carry no messages.
    #[must_use]
    pub fn pending_flashes(&self, headers: &HeaderMap) -> Vec<String> {
        token::cookie_value(headers, FLASH_COOKIE_NAME)
            .and_then(|value| self.signer.verify(FLASH_PURPOSE, &value))
            .and_then(|payload| serde_json::from_slice::<FlashPayload>(&payload).ok())
            .map(|payload| payload.messages)
            .unwrap_or_default()
    }

    /// Cookie queueing `messages` for the next render.
    ///
    /// # Errors
    /// Returns an error if the messages cannot be encoded or signed.
    pub fn flash_cookie(&self, messages: &[String]) -> Result<HeaderValue, SessionError> {
        let payload = serde_json::to_vec(&FlashPayload {
            messages: messages.to_vec(),
        })?;
        let value = self
            .signer
            .sign(FLASH_PURPOSE, &payload)
            .ok_or(SessionError::Sign)?;
        Ok(token::set_cookie(
            FLASH_COOKIE_NAME,
            &value,
            None,
            self.config().cookie_secure(),
        )?)
    }

    /// Append `message` to whatever is already pending in the request, unless
    /// the same message is already queued.
    ///
    /// # Errors
    /// Returns an error if the messages cannot be encoded or signed.
    pub fn queue_flash(&self, headers: &HeaderMap, message: &str) -> Result<HeaderValue, SessionError> {
        let mut messages = self.pending_flashes(headers);
        if !messages.iter().any(|pending| pending == message) {
            messages.push(message.to_string());
        }
        self.flash_cookie(&messages)
    }

    /// Cookie marking all pending messages as consumed.
    ///
    /// # Errors
    /// Returns an error if the cookie cannot be encoded as a header value.
    pub fn clear_flashes(&self) -> Result<HeaderValue, SessionError> {
        Ok(token::clear_cookie(
            FLASH_COOKIE_NAME,
            self.config().cookie_secure(),
        )?)
    }
}
