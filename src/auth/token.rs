//! HMAC-signed tokens and cookie plumbing shared by sessions and flash messages.
//!
//! A token is `base64url(payload) "." base64url(HMAC-SHA256(purpose "." payload))`.
//! The purpose keeps a token minted for one cookie from being replayed in another.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretSlice};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const MIN_SECRET_LEN: usize = 32;

pub struct TokenSigner {
    key: SecretSlice<u8>,
}

impl TokenSigner {
    /// Returns `None` when the key is shorter than [`MIN_SECRET_LEN`].
    #[must_use]
    pub fn new(key: &[u8]) -> Option<Self> {
        if key.len() < MIN_SECRET_LEN {
            return None;
        }
        Some(Self {
            key: SecretSlice::from(key.to_vec()),
        })
    }

    /// A signer keyed with fresh random bytes; tokens die with the process.
    #[must_use]
    pub fn random() -> Self {
        let mut key = vec![0u8; MIN_SECRET_LEN];
        OsRng.fill_bytes(&mut key);
        Self {
            key: SecretSlice::from(key),
        }
    }

    fn mac(&self, purpose: &str, encoded_payload: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.key.expose_secret()).ok()?;
        mac.update(purpose.as_bytes());
        mac.update(b".");
        mac.update(encoded_payload.as_bytes());
        Some(mac)
    }

    #[must_use]
    pub fn sign(&self, purpose: &str, payload: &[u8]) -> Option<String> {
        let encoded = Base64UrlUnpadded::encode_string(payload);
        let signature = self.mac(purpose, &encoded)?.finalize().into_bytes();
        Some(format!(
            "{encoded}.{}",
            Base64UrlUnpadded::encode_string(&signature)
        ))
    }

    /// Return the payload if the signature matches, `None` otherwise.
    #[must_use]
    pub fn verify(&self, purpose: &str, token: &str) -> Option<Vec<u8>> {
        let (encoded, signature) = token.split_once('.')?;
        let signature = Base64UrlUnpadded::decode_vec(signature).ok()?;
        // verify_slice compares in constant time.
        self.mac(purpose, encoded)?.verify_slice(&signature).ok()?;
        Base64UrlUnpadded::decode_vec(encoded).ok()
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").field("key", &"***").finish()
    }
}

/// Find a cookie by name across all `Cookie` headers.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let Some((key, val)) = pair.trim().split_once('=') else {
                continue;
            };
            if key.trim() == name {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

/// Build a `Set-Cookie` value. `max_age` of `None` yields a browser-session cookie.
///
/// # Errors
/// Returns an error if the value contains characters not allowed in a header.
pub fn set_cookie(
    name: &str,
    value: &str,
    max_age: Option<i64>,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(seconds) = max_age {
        cookie.push_str(&format!("; Max-Age={seconds}"));
    }
    // Only mark cookies secure when the proxy serves the site over HTTPS.
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build a `Set-Cookie` value that deletes the cookie.
///
/// # Errors
/// Returns an error if the name contains characters not allowed in a header.
pub fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    set_cookie(name, "", Some(0), secure)
}
