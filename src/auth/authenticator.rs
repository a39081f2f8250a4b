//! Credential validation against a [`CredentialStore`].

use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;

use super::{
    password,
    store::{CredentialStore, UserRecord},
};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("username and password are required")]
    MissingCredentials,
    #[error("unknown user")]
    UnknownUser,
    #[error("invalid password")]
    InvalidPassword,
}

impl AuthError {
    /// Empty input, as opposed to a credential mismatch.
    #[must_use]
    pub const fn is_input_validation(self) -> bool {
        matches!(self, Self::MissingCredentials)
    }
}

pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    // Unknown usernames are verified against this hash so they cost the same as a wrong password.
    dummy_hash: String,
}

impl Authenticator {
    /// # Errors
    /// Returns an error if the timing-equalization hash cannot be computed.
    pub fn new(store: Arc<dyn CredentialStore>) -> Result<Self> {
        let dummy_hash = password::hash_password(&ulid::Ulid::new().to_string())?;
        Ok(Self { store, dummy_hash })
    }

    /// Validate a username/password pair. The username is trimmed, the password is not.
    ///
    /// This runs Argon2 and should be called from a blocking context.
    ///
    /// # Errors
    /// Returns [`AuthError::MissingCredentials`] for empty input, otherwise
    /// [`AuthError::UnknownUser`] or [`AuthError::InvalidPassword`].
    pub fn authenticate(&self, username: &str, password: &str) -> Result<UserRecord, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        match self.store.lookup(username) {
            Some(user) => {
                if password::verify_password(password, &user.password_hash) {
                    Ok(user.clone())
                } else {
                    Err(AuthError::InvalidPassword)
                }
            }
            None => {
                let _ = password::verify_password(password, &self.dummy_hash);
                Err(AuthError::UnknownUser)
            }
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::store::{Role, StaticCredentialStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts lookups so tests can tell whether the store was consulted at all.
    struct CountingStore {
        inner: StaticCredentialStore,
        lookups: AtomicUsize,
    }

    impl CredentialStore for CountingStore {
        fn lookup(&self, username: &str) -> Option<&UserRecord> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(username)
        }
    }

    fn counting() -> Arc<CountingStore> {
        Arc::new(CountingStore {
            inner: StaticCredentialStore::demo().unwrap(),
            lookups: AtomicUsize::new(0),
        })
    }

    #[test]
    fn accepts_every_demo_account() {
        let authenticator = Authenticator::new(Arc::new(StaticCredentialStore::demo().unwrap()))
            .unwrap();

        for (username, secret, role) in [
            ("admin", "admin123", Role::Administrator),
            ("user", "password", Role::User),
            ("test", "test123", Role::Tester),
        ] {
            let user = authenticator.authenticate(username, secret).unwrap();
            assert_eq!(user.username, username);
            assert_eq!(user.role, role);
        }
    }

    #[test]
    fn rejects_mismatched_pairs() {
        let authenticator = Authenticator::new(Arc::new(StaticCredentialStore::demo().unwrap()))
            .unwrap();

        assert_eq!(
            authenticator.authenticate("admin", "password"),
            Err(AuthError::InvalidPassword)
        );
        assert_eq!(
            authenticator.authenticate("user", "admin123"),
            Err(AuthError::InvalidPassword)
        );
        assert_eq!(
            authenticator.authenticate("nobody", "admin123"),
            Err(AuthError::UnknownUser)
        );
        // The password is compared verbatim.
        assert_eq!(
            authenticator.authenticate("admin", " admin123"),
            Err(AuthError::InvalidPassword)
        );
    }

    #[test]
    fn trims_username() {
        let authenticator = Authenticator::new(Arc::new(StaticCredentialStore::demo().unwrap()))
            .unwrap();
        let user = authenticator.authenticate("  admin \t", "admin123").unwrap();
        assert_eq!(user.username, "admin");
    }

    #[test]
    fn empty_input_never_reaches_the_store() {
        let store = counting();
        let authenticator = Authenticator::new(store.clone()).unwrap();

        for (username, secret) in [("", "admin123"), ("admin", ""), ("   ", "x"), ("", "")] {
            let err = authenticator.authenticate(username, secret).unwrap_err();
            assert_eq!(err, AuthError::MissingCredentials);
            assert!(err.is_input_validation());
        }
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);

        let err = authenticator.authenticate("admin", "nope").unwrap_err();
        assert!(!err.is_input_validation());
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }
}
