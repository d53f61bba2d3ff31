// API documentation
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use crate::handlers::{history, scan};
use crate::models::{
    advisory::{Advisory, HighestSeverity, Severity},
    features::FeatureVector,
    scan::{
        ClassifyRequest, ClassifyResponse, ClearHistoryResponse, FeatureBreakdown, Label,
        PageSnapshot, RiskLevel, ScanRequest, ScanResult, ScanStatus,
    },
};
use crate::utils::scan_errors::ScanErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PhishScan API",
        version = "1.0.0",
        description = "Hybrid phishing detection for URLs and the pages behind them"
    ),
    paths(
        crate::health_check,
        scan::scan_url,
        scan::classify_url,
        history::get_history,
        history::clear_history
    ),
    components(schemas(
        ScanRequest,
        ScanResult,
        ClassifyRequest,
        ClassifyResponse,
        FeatureBreakdown,
        FeatureVector,
        PageSnapshot,
        Advisory,
        Severity,
        HighestSeverity,
        Label,
        RiskLevel,
        ScanStatus,
        ClearHistoryResponse,
        ScanErrorResponse
    )),
    tags(
        (name = "Scan", description = "URL classification and feature breakdown"),
        (name = "History", description = "Capped log of completed scans"),
        (name = "Health", description = "Service health checks")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification at /api/v1/docs/openapi.json
pub async fn serve_openapi_spec() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        ApiDoc::openapi().to_json().unwrap_or_default(),
    )
        .into_response()
}
