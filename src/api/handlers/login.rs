use axum::{
    extract::{rejection::FormRejection, RawQuery, State},
    http::{header::SET_COOKIE, HeaderMap, Uri},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use tracing::debug;
use url::form_urlencoded;

use super::{errors::AppError, take_flashes};
use crate::{
    api::{client_ip::ClientIp, pages, state::AppContext},
    audit,
    auth::AuthError,
};

pub const MISSING_CREDENTIALS_MESSAGE: &str = "Nom d'utilisateur et mot de passe requis.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Nom d'utilisateur ou mot de passe incorrect.";
pub const DEFAULT_LANDING: &str = "/private";

#[derive(Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// `next` when it stays on this site, otherwise [`DEFAULT_LANDING`].
///
/// Accepts absolute paths only: `//host` and `/\host` are protocol-relative
/// to browsers and are refused.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    static LOCAL_PATH: OnceLock<Option<Regex>> = OnceLock::new();
    let local = LOCAL_PATH
        .get_or_init(|| Regex::new(r"^/(?:[^/\\]|$)").ok())
        .as_ref();

    match (next, local) {
        (Some(next), Some(local))
            if local.is_match(next) && !next.chars().any(char::is_control) =>
        {
            next
        }
        _ => DEFAULT_LANDING,
    }
}

/// First `next` parameter of a raw query string. Repeats are ignored.
fn next_param(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "next")
        .map(|(_, value)| value.into_owned())
}

fn form_action(uri: &Uri) -> &str {
    uri.path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str())
}

// axum handler for GET /login
pub async fn login_form(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, AppError> {
    let (flashes, clear) = take_flashes(ctx.sessions(), &headers)?;
    let page = pages::login(form_action(&uri), &flashes);

    Ok((
        AppendHeaders(clear.map(|cookie| (SET_COOKIE, cookie))),
        Html(page),
    )
        .into_response())
}

// axum handler for POST /login
pub async fn login_submit(
    State(ctx): State<Arc<AppContext>>,
    ClientIp(ip): ClientIp,
    RawQuery(query): RawQuery,
    uri: Uri,
    headers: HeaderMap,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    // A body that is not a urlencoded form carries no credentials.
    let form = form.map_or_else(
        |rejection| {
            debug!("Unreadable login form: {}", rejection);
            LoginForm::default()
        },
        |Form(form)| form,
    );
    let username = form.username.trim().to_string();

    let worker = Arc::clone(&ctx);
    let submitted = username.clone();
    let result = tokio::task::spawn_blocking(move || {
        worker.authenticator().authenticate(&submitted, &form.password)
    })
    .await?;

    let message = match result {
        Ok(user) => {
            let sessions = ctx.sessions();
            let (_session, token) = sessions.create(&user, &ip, Utc::now())?;
            audit::login_success(&user.username, &ip);

            let next = next_param(query.as_deref());
            let target = safe_next(next.as_deref());
            debug!("Login succeeded, redirecting to {}", target);
            return Ok((
                AppendHeaders([(SET_COOKIE, sessions.session_cookie(&token)?)]),
                Redirect::to(target),
            )
                .into_response());
        }
        Err(AuthError::MissingCredentials) => {
            audit::login_empty_credentials(&ip);
            MISSING_CREDENTIALS_MESSAGE
        }
        Err(AuthError::UnknownUser | AuthError::InvalidPassword) => {
            audit::login_failure(&username, &ip);
            INVALID_CREDENTIALS_MESSAGE
        }
    };

    // Messages already pending (e.g. from the guard) are shown along with the failure.
    let (mut flashes, clear) = take_flashes(ctx.sessions(), &headers)?;
    flashes.push(message.to_string());
    let page = pages::login(form_action(&uri), &flashes);

    Ok((
        AppendHeaders(clear.map(|cookie| (SET_COOKIE, cookie))),
        Html(page),
    )
        .into_response())
}
