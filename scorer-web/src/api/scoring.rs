//! Scoring workflow endpoints
//!
//! The scorer identity travels with every request: as a query parameter on
//! reads and as a body field on submission. There is no server-side session.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use scorer_core::assignment::NextAssignment;
use scorer_core::progress::ProgressReport;
use scorer_core::service::SubmitReceipt;
use scorer_core::store::MeasurementPair;

use crate::api::error::ApiResult;
use crate::AppState;

/// Query string carrying the scorer identity
#[derive(Debug, Deserialize)]
pub struct ScorerQuery {
    #[serde(default)]
    pub scorer_id: String,
}

/// Request body for POST /api/submit
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub scorer_id: String,
    #[serde(default)]
    pub image_code: String,
    #[serde(default)]
    pub measurements: Vec<MeasurementPair>,
}

/// GET /api/next?scorer_id=...
///
/// Next unscored image for this scorer, or a done marker.
pub async fn next_assignment(
    State(state): State<AppState>,
    Query(query): Query<ScorerQuery>,
) -> ApiResult<Json<NextAssignment>> {
    let next = state.service.next_assignment(&query.scorer_id).await?;
    Ok(Json(next))
}

/// POST /api/submit
///
/// Record a batch of point-pair measurements for one image.
pub async fn submit_measurements(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<Json<SubmitReceipt>> {
    let receipt = state
        .service
        .submit(&request.scorer_id, &request.image_code, &request.measurements)
        .await?;
    Ok(Json(receipt))
}

/// GET /api/progress?scorer_id=...
pub async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<ScorerQuery>,
) -> ApiResult<Json<ProgressReport>> {
    let report = state.service.progress(&query.scorer_id).await?;
    Ok(Json(report))
}
