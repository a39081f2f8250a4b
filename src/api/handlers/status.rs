use axum::{extract::State, http::HeaderMap, response::Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::iso_timestamp;
use crate::{api::state::AppContext, APP_VERSION};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Status {
    pub status: String,
    /// ISO-8601 local time.
    pub timestamp: String,
    /// Whether the request carries a valid session.
    pub authenticated: bool,
    pub version: String,
}

#[utoipa::path(
    get,
    path= "/api/status",
    responses (
        (status = 200, description = "Application status and caller authentication state", body = Status)
    ),
    tag= "status"
)]
// axum handler for status
pub async fn status(State(ctx): State<Arc<AppContext>>, headers: HeaderMap) -> Json<Status> {
    Json(Status {
        status: "active".to_string(),
        timestamp: iso_timestamp(),
        authenticated: ctx.sessions().is_authenticated(&headers, Utc::now()),
        version: APP_VERSION.to_string(),
    })
}
