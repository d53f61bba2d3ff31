// Scan and feature breakdown endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::debug;

use crate::{
    app::AppState,
    models::scan::{ClassifyRequest, ClassifyResponse, ScanRequest, ScanResult},
    utils::scan_errors::{ScanApiResult, ScanErrorResponse},
};

// =============================================================================
// SCAN HANDLERS
// =============================================================================

/// Classify a URL together with its page signals
/// POST /api/v1/scan
#[utoipa::path(
    post,
    path = "/api/v1/scan",
    tag = "Scan",
    operation_id = "scanUrl",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan completed", body = ScanResult),
        (status = 400, description = "Bad request - missing or invalid URL", body = ScanErrorResponse),
        (status = 500, description = "Internal error in a pipeline stage", body = ScanErrorResponse),
        (status = 503, description = "URL model not loaded", body = ScanErrorResponse)
    )
)]
pub async fn scan_url(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> ScanApiResult<Json<ScanResult>> {
    let Json(request) = payload?;
    debug!("Scan requested for {}", request.url.trim());

    let result = state.scan_service.scan(request).await?;
    Ok(Json(result))
}

/// URL model probability with the per-feature breakdown
/// POST /api/v1/classify
#[utoipa::path(
    post,
    path = "/api/v1/classify",
    tag = "Scan",
    operation_id = "classifyUrl",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Breakdown computed", body = ClassifyResponse),
        (status = 400, description = "Bad request - missing or invalid URL", body = ScanErrorResponse),
        (status = 503, description = "URL model not loaded", body = ScanErrorResponse)
    )
)]
pub async fn classify_url(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> ScanApiResult<Json<ClassifyResponse>> {
    let Json(request) = payload?;

    let response = state.scan_service.classify(&request.url).await?;
    Ok(Json(response))
}
