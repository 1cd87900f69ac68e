//! UI serving routes
//!
//! Serves the static HTML/JS scoring interface

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

const INDEX_HTML: &str = include_str!("../ui/index.html");
const ADMIN_HTML: &str = include_str!("../ui/admin.html");
const APP_JS: &str = include_str!("../ui/app.js");

/// GET /
///
/// Serves the scoring page
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /admin
///
/// Serves the study-status page
pub async fn serve_admin() -> Html<&'static str> {
    Html(ADMIN_HTML)
}

/// GET /static/app.js
///
/// Serves the JavaScript application
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}
