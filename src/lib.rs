//! # Webgate (login and private area behind a reverse proxy)
//!
//! `webgate` serves a public home page, a login form, a protected page and two
//! JSON status endpoints. It is meant to run on loopback behind a reverse proxy
//! that terminates TLS and bans abusive clients by tailing the audit log.
//!
//! ## Authentication
//!
//! Users come from a [`auth::CredentialStore`]. Passwords are stored as
//! Argon2id PHC strings and verified on the blocking pool. Empty input and
//! credential mismatches produce the same message for the end user, while the
//! audit log keeps them apart.
//!
//! ## Sessions
//!
//! There is no server-side session registry. A session is a signed cookie
//! (`HMAC-SHA256`) that expires one hour after login. Expired, tampered or
//! malformed cookies are treated exactly like a missing cookie.
//!
//! ## Audit log
//!
//! Events emitted on the [`audit::AUDIT_TARGET`] target are appended to
//! `<log-dir>/app.log` as `timestamp - LEVEL - message` lines.

pub mod api;
pub mod audit;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

/// Version reported by `/api/status`.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_version_matches_package() {
        assert_eq!(APP_VERSION, "1.0.0");
    }
}
