use crate::audit;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::get,
    Router,
};
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

pub mod client_ip;
pub mod guard;
pub mod handlers;
pub mod pages;
pub mod state;
// OpenAPI document for the JSON endpoints, also printed by the `openapi` binary.
mod openapi;

pub use openapi::openapi;
pub use state::AppContext;

use handlers::{errors, health, home, login, logout, private, status};

/// Every route of the application with the shared middleware stack applied.
#[must_use]
pub fn router(ctx: Arc<AppContext>) -> Router {
    let protected = Router::new()
        .route("/private", get(private::private))
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            guard::require_authenticated,
        ));

    let routes = Router::new()
        .route("/", get(home::home))
        .route("/login", get(login::login_form).post(login::login_submit))
        .route("/logout", get(logout::logout))
        .route("/api/status", get(status::status))
        .route("/health", get(health::health))
        .merge(protected)
        .fallback(errors::not_found);

    with_layers(routes, ctx)
}

/// Request ids, tracing spans, error pages and panic recovery, outermost first.
fn with_layers(routes: Router<Arc<AppContext>>, ctx: Arc<AppContext>) -> Router {
    routes
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(middleware::from_fn_with_state(
                    ctx.clone(),
                    errors::render_errors,
                ))
                .layer(CatchPanicLayer::custom(errors::handle_panic)),
        )
        .with_state(ctx)
}

/// Start the server on loopback
/// # Errors
/// Return error if the port cannot be bound or the server fails
pub async fn new(port: u16, ctx: Arc<AppContext>) -> Result<()> {
    let address = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    serve(listener, ctx).await
}

/// Serve on an already bound listener until Ctrl-C or SIGTERM.
/// # Errors
/// Return error if the server fails
pub async fn serve(listener: TcpListener, ctx: Arc<AppContext>) -> Result<()> {
    let address = listener.local_addr()?;
    audit::startup(&address.to_string());
    info!("Listening on {}", address);

    axum::serve(
        listener,
        router(ctx).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Gracefully shutdown");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Shutting down (ctrl-c)"),
        () = terminate => info!("Shutting down (SIGTERM)"),
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
