//! Route guard for pages that need a logged-in user.

use axum::{
    body::Body,
    extract::State,
    http::{header::SET_COOKIE, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};
use url::form_urlencoded;

use super::{handlers::errors::AppError, state::AppContext};

pub const LOGIN_REQUIRED_MESSAGE: &str = "Vous devez être connecté pour accéder à cette page.";

/// Let authenticated requests through with their [`Session`](crate::auth::Session)
/// as a request extension; send everybody else to the login form.
pub async fn require_authenticated(
    State(ctx): State<Arc<AppContext>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let sessions = ctx.sessions();
    if let Some(session) = sessions.from_headers(request.headers(), Utc::now()) {
        request.extensions_mut().insert(session);
        return next.run(request).await;
    }

    let target = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path(), |pq| pq.as_str());
    debug!("Anonymous request to {}, redirecting to login", target);

    let flash = match sessions.queue_flash(request.headers(), LOGIN_REQUIRED_MESSAGE) {
        Ok(flash) => flash,
        Err(err) => {
            error!("Failed to queue login flash: {}", err);
            return AppError::from(err).into_response();
        }
    };

    (
        [(SET_COOKIE, flash)],
        Redirect::to(&login_url(target)),
    )
        .into_response()
}

/// `/login?next=<target>` with `target` form-encoded.
#[must_use]
pub fn login_url(target: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("/login?next={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_encodes_target() {
        assert_eq!(login_url("/private"), "/login?next=%2Fprivate");
        assert_eq!(
            login_url("/private?tab=a&b=c"),
            "/login?next=%2Fprivate%3Ftab%3Da%26b%3Dc"
        );
    }
}
