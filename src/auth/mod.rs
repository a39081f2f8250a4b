//! Credential checks, password hashing, and the signed session and flash cookies.

pub mod authenticator;
pub mod flash;
pub mod password;
pub mod session;
pub mod store;
pub mod token;

pub use authenticator::{AuthError, Authenticator};
pub use session::{Session, SessionConfig, SessionError, SessionManager};
pub use store::{CredentialStore, Role, StaticCredentialStore, StoreError, UserRecord};
