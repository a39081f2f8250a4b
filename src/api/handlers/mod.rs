use axum::http::{HeaderMap, HeaderValue};
use chrono::{Local, SecondsFormat};

use crate::auth::{SessionError, SessionManager};

pub mod errors;
pub mod health;
pub mod home;
pub mod login;
pub mod logout;
pub mod private;
pub mod status;

/// Local wall-clock time as shown on pages.
fn display_time() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// ISO-8601 local time with offset, as reported by the JSON endpoints.
fn iso_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Take the pending flash messages; when there were any, also return the
/// cookie that marks them as shown.
fn take_flashes(
    sessions: &SessionManager,
    headers: &HeaderMap,
) -> Result<(Vec<String>, Option<HeaderValue>), SessionError> {
    let flashes = sessions.pending_flashes(headers);
    if flashes.is_empty() {
        return Ok((flashes, None));
    }
    Ok((flashes, Some(sessions.clear_flashes()?)))
}
