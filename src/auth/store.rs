//! Credential store: username to user record lookup.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, fs, path::Path};
use thiserror::Error;

use super::password;

/// Built-in demonstration accounts: username, password, role, display name.
const DEMO_ACCOUNTS: [(&str, &str, Role, &str); 3] = [
    ("admin", "admin123", Role::Administrator, "Administrateur"),
    ("user", "password", Role::User, "Utilisateur Standard"),
    ("test", "test123", Role::Tester, "Utilisateur Test"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    User,
    Tester,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::User => "user",
            Self::Tester => "tester",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account. Immutable once loaded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub display_name: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("password_hash", &"***")
            .field("role", &self.role)
            .field("display_name", &self.display_name)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read users file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid users file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("users file contains an empty username")]
    EmptyUsername,
    #[error("duplicate username: {0}")]
    Duplicate(String),
    #[error("password hash for user {0} is not a PHC string")]
    InvalidHash(String),
    #[error("failed to hash password for user {0}")]
    Hash(String),
}

/// Read-only lookup of user records by username.
///
/// Route logic only depends on this trait, so a database-backed store can be
/// swapped in without touching the handlers.
pub trait CredentialStore: Send + Sync {
    fn lookup(&self, username: &str) -> Option<&UserRecord>;
}

/// In-memory credential table, loaded once at start-up.
#[derive(Debug, Default)]
pub struct StaticCredentialStore {
    users: HashMap<String, UserRecord>,
}

impl StaticCredentialStore {
    /// Build a store from records whose `password_hash` is already a PHC string.
    ///
    /// # Errors
    /// Returns an error on empty or duplicate usernames, or on malformed hashes.
    pub fn from_records(records: Vec<UserRecord>) -> Result<Self, StoreError> {
        let mut users = HashMap::with_capacity(records.len());
        for record in records {
            if record.username.trim().is_empty() {
                return Err(StoreError::EmptyUsername);
            }
            if !password::is_phc_hash(&record.password_hash) {
                return Err(StoreError::InvalidHash(record.username));
            }
            if users.contains_key(&record.username) {
                return Err(StoreError::Duplicate(record.username));
            }
            users.insert(record.username.clone(), record);
        }
        Ok(Self { users })
    }

    /// The three demonstration accounts, hashed at call time.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    pub fn demo() -> Result<Self, StoreError> {
        let records = DEMO_ACCOUNTS
            .iter()
            .map(|&(username, secret, role, display_name)| {
                let password_hash = password::hash_password(secret)
                    .map_err(|_| StoreError::Hash(username.to_string()))?;
                Ok(UserRecord {
                    username: username.to_string(),
                    password_hash,
                    role,
                    display_name: display_name.to_string(),
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        Self::from_records(records)
    }

    /// Parse a JSON array of user records.
    ///
    /// # Errors
    /// Returns an error if the JSON is invalid or a record is rejected.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let records: Vec<UserRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Load a JSON users file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialStore for StaticCredentialStore {
    fn lookup(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }
}
