//! Argon2id password hashing.
//!
//! Stored credentials are PHC strings (`$argon2id$v=19$...`) so the salt and
//! cost parameters travel with the hash.

use anyhow::{anyhow, Result};
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

/// Hash a password with a fresh random salt.
///
/// # Errors
/// Returns an error if Argon2 rejects the input (e.g. it exceeds the maximum length).
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| anyhow!("failed to hash password"))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored PHC string.
///
/// A malformed stored hash never verifies.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Whether `stored` parses as a PHC string.
#[must_use]
pub fn is_phc_hash(stored: &str) -> bool {
    PasswordHash::new(stored).is_ok()
}
