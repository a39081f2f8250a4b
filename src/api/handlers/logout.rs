use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use std::sync::Arc;

use super::errors::AppError;
use crate::{
    api::{client_ip::ClientIp, state::AppContext},
    audit,
};

pub const LOGGED_OUT_MESSAGE: &str = "Vous avez été déconnecté avec succès.";
/// Username logged when nobody was signed in.
pub const ANONYMOUS_USER: &str = "unknown";

// axum handler for GET /logout, works with or without a session
pub async fn logout(
    State(ctx): State<Arc<AppContext>>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let sessions = ctx.sessions();
    let username = sessions
        .from_headers(&headers, Utc::now())
        .map_or_else(|| ANONYMOUS_USER.to_string(), |session| session.username);
    audit::logout(&username, &ip);

    let cleared = sessions.destroy()?;
    let flash = sessions.queue_flash(&headers, LOGGED_OUT_MESSAGE)?;

    Ok((
        AppendHeaders([(SET_COOKIE, cleared), (SET_COOKIE, flash)]),
        Redirect::to("/"),
    )
        .into_response())
}
