use axum::{
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use super::iso_timestamp;
use crate::GIT_COMMIT_HASH;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    status: String,
    timestamp: String,
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "The application is running", body = Health)
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health() -> impl IntoResponse {
    let health = Health {
        status: "healthy".to_string(),
        timestamp: iso_timestamp(),
    };

    (x_app_headers(), Json(health))
}

/// `X-App: name:version:short-commit`; empty when the value cannot be encoded.
fn x_app_headers() -> HeaderMap {
    let short_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        ""
    };

    format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )
    .parse::<HeaderValue>()
    .map(|value| {
        debug!("X-App header: {:?}", value);
        let mut headers = HeaderMap::new();
        headers.insert("X-App", value);
        headers
    })
    .unwrap_or_else(|err| {
        error!("Failed to parse X-App header: {}", err);
        HeaderMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_app_header_names_the_build() {
        let headers = x_app_headers();
        let value = headers
            .get("X-App")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(value.starts_with("webgate:1.0.0:"));
    }
}
