// Scan history endpoints

use axum::{extract::State, Json};
use tracing::info;

use crate::{
    app::AppState,
    models::scan::{ClearHistoryResponse, ScanResult},
    utils::audit_logger::AuditLogger,
};

/// Recorded scans, newest first
/// GET /api/v1/history
#[utoipa::path(
    get,
    path = "/api/v1/history",
    tag = "History",
    operation_id = "getHistory",
    responses(
        (status = 200, description = "Recorded scans, newest first", body = [ScanResult])
    )
)]
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<ScanResult>> {
    Json(state.scan_service.history().list().await)
}

/// Wipe the scan log
/// DELETE /api/v1/history
#[utoipa::path(
    delete,
    path = "/api/v1/history",
    tag = "History",
    operation_id = "clearHistory",
    responses(
        (status = 200, description = "History cleared", body = ClearHistoryResponse)
    )
)]
pub async fn clear_history(State(state): State<AppState>) -> Json<ClearHistoryResponse> {
    let removed = state.scan_service.history().clear().await;

    info!("Cleared {} scans from history", removed);
    AuditLogger::log_history_cleared(removed);

    Json(ClearHistoryResponse {
        status: "cleared".to_string(),
        count: 0,
    })
}
