//! HTTP API handlers for scorer-web

pub mod admin;
pub mod assets;
pub mod error;
pub mod health;
pub mod scoring;
pub mod ui;

pub use admin::{admin_status, export_scores};
pub use assets::{serve_image, serve_reference};
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use scoring::{get_progress, next_assignment, submit_measurements};
pub use ui::{serve_admin, serve_app_js, serve_index};
