//! scorer-web library - HTTP transport for the scoring workflow
//!
//! Thin axum layer over `scorer-core`: routing, request/response shapes,
//! static UI pages, and asset serving. All workflow rules live in the
//! core crate.

use std::sync::Arc;

use axum::Router;
use scorer_core::config::Config;
use scorer_core::ScoringService;
use tower_http::cors::CorsLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Scoring workflow engine
    pub service: Arc<ScoringService>,
    /// Filesystem layout for image and reference assets
    pub config: Config,
}

impl AppState {
    pub fn new(service: Arc<ScoringService>, config: Config) -> Self {
        Self { service, config }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        // UI pages
        .route("/", get(api::serve_index))
        .route("/admin", get(api::serve_admin))
        .route("/static/app.js", get(api::serve_app_js))
        // Scoring workflow
        .route("/api/next", get(api::next_assignment))
        .route("/api/submit", post(api::submit_measurements))
        .route("/api/progress", get(api::get_progress))
        // Aggregation
        .route("/api/admin/status", get(api::admin_status))
        .route("/api/admin/export", get(api::export_scores))
        // Image assets
        .route("/images/:code", get(api::serve_image))
        .route("/reference/:kind", get(api::serve_reference))
        .merge(api::health_routes())
        .with_state(state)
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}
