use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

use super::{display_time, errors::AppError, take_flashes};
use crate::{
    api::{client_ip::ClientIp, pages, state::AppContext},
    audit,
};

// axum handler for the public home page
pub async fn home(
    State(ctx): State<Arc<AppContext>>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    audit::home_access(&ip);

    let sessions = ctx.sessions();
    let session = sessions.from_headers(&headers, Utc::now());
    let (flashes, clear) = take_flashes(sessions, &headers)?;
    let page = pages::home(session.as_ref(), &flashes, &display_time());

    Ok((
        AppendHeaders(clear.map(|cookie| (SET_COOKIE, cookie))),
        Html(page),
    )
        .into_response())
}
