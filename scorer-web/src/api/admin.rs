//! Aggregation endpoints: study-wide status and bulk export

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;

use scorer_core::report::AdminStatus;

use crate::api::error::ApiResult;
use crate::AppState;

/// GET /api/admin/status
///
/// Completion statistics for every scorer found in storage.
pub async fn admin_status(State(state): State<AppState>) -> ApiResult<Json<AdminStatus>> {
    let status = state.service.admin_status()?;
    Ok(Json(status))
}

/// GET /api/admin/export
///
/// Download every scorer's log plus the manifest as one gzipped tar
/// archive. 404 with NO_DATA until the first measurement is recorded.
pub async fn export_scores(State(state): State<AppState>) -> ApiResult<Response> {
    let archive = state.service.export_archive()?;
    let filename = format!("all_scores_{}.tar.gz", Utc::now().format("%Y%m%d_%H%M%S"));
    Ok((
        [
            (header::CONTENT_TYPE, "application/gzip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        archive,
    )
        .into_response())
}
