//! 404 and 500 handling.
//!
//! Handlers fail with [`AppError`], which only sets the status and attaches
//! an [`ErrorDetail`]. [`render_errors`] sits outside every route, audits each
//! 500 and swaps the body for the error page. Panics are turned into the same
//! kind of response by [`handle_panic`].

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, Uri},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use std::{any::Any, sync::Arc};
use tracing::error;

use crate::{
    api::{client_ip::ClientIp, pages, state::AppContext},
    audit,
};

/// What went wrong, carried from the failing handler to [`render_errors`].
#[derive(Clone, Debug)]
pub struct ErrorDetail(pub String);

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        server_error_response(format!("{:#}", self.0))
    }
}

fn server_error_response(detail: String) -> Response {
    let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
    response.extensions_mut().insert(ErrorDetail(detail));
    response
}

/// Handler for `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "Unknown panic message".to_string()
    };
    error!("Handler panicked: {}", detail);
    server_error_response(detail)
}

pub async fn not_found(ClientIp(ip): ClientIp, uri: Uri) -> impl IntoResponse {
    audit::not_found(&ip, &uri.to_string());
    (StatusCode::NOT_FOUND, Html(pages::not_found()))
}

pub async fn render_errors(
    State(ctx): State<Arc<AppContext>>,
    ClientIp(ip): ClientIp,
    request: Request<Body>,
    next: Next,
) -> Response {
    let target = request.uri().to_string();
    let response = next.run(request).await;
    if response.status() != StatusCode::INTERNAL_SERVER_ERROR {
        return response;
    }

    let detail = response
        .extensions()
        .get::<ErrorDetail>()
        .map_or_else(|| "Internal Server Error".to_string(), |detail| detail.0.clone());
    audit::server_error(&ip, &target, &detail);

    let page = pages::server_error(ctx.dev_mode().then_some(detail.as_str()));
    (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_carries_detail() {
        let response = AppError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<ErrorDetail>().map(|d| d.0.clone());
        assert_eq!(detail.as_deref(), Some("boom"));
    }

    #[test]
    fn panic_payloads_are_described() {
        let response = handle_panic(Box::new("static message"));
        let detail = response.extensions().get::<ErrorDetail>().map(|d| d.0.clone());
        assert_eq!(detail.as_deref(), Some("static message"));

        let response = handle_panic(Box::new(String::from("owned message")));
        let detail = response.extensions().get::<ErrorDetail>().map(|d| d.0.clone());
        assert_eq!(detail.as_deref(), Some("owned message"));

        let response = handle_panic(Box::new(42_u8));
        let detail = response.extensions().get::<ErrorDetail>().map(|d| d.0.clone());
        assert_eq!(detail.as_deref(), Some("Unknown panic message"));
    }
}
