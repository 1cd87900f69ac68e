//! Image asset serving
//!
//! Composite images and the two reference images live on disk under the
//! data root. A missing file is a not-found result for that one asset and
//! never affects the rest of the workflow.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use scorer_core::catalog::ReferenceKind;

use crate::api::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /images/:code
///
/// Serve one aligned composite image by catalog code.
pub async fn serve_image(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Response> {
    // The code becomes a file name under the aligned-output directory
    if code.is_empty() || code == ".." || code.contains(['/', '\\']) {
        return Err(ApiError::BadRequest(format!("Invalid image code: {}", code)));
    }
    serve_png(state.config.image_path(&code)).await
}

/// GET /reference/:kind
///
/// Serve the reference image for a capture-system family ("ar" or
/// "screen").
pub async fn serve_reference(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Response> {
    let kind = ReferenceKind::parse(&kind)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown reference kind: {}", kind)))?;
    serve_png(state.config.reference_path(kind)).await
}

async fn serve_png(path: std::path::PathBuf) -> ApiResult<Response> {
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::NotFound(format!(
            "Image not found: {}",
            path.display()
        ))),
        Err(e) => Err(ApiError::Internal(format!("Failed to read image: {}", e))),
    }
}
