use axum::{extract::Extension, response::Html};

use super::display_time;
use crate::{
    api::{client_ip::ClientIp, pages},
    audit,
    auth::Session,
};

// axum handler for the protected page, the session is inserted by the route guard
pub async fn private(
    Extension(session): Extension<Session>,
    ClientIp(ip): ClientIp,
) -> Html<String> {
    audit::private_access(&session.username, &ip);
    Html(pages::private(&session, &ip, &display_time()))
}
