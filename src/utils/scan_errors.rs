// Scan API error handling
// Maps component failures onto HTTP responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::services::feature_extraction::FeatureError;
use crate::services::hybrid_fusion::FusionError;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Pipeline stage an internal failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStage {
    UrlModel,
    Fusion,
}

impl std::fmt::Display for ScanStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStage::UrlModel => write!(f, "url_model"),
            ScanStage::Fusion => write!(f, "fusion"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error during {stage}: {message}")]
    Internal { stage: ScanStage, message: String },
}

impl ScanError {
    pub fn internal(stage: ScanStage, message: impl Into<String>) -> Self {
        ScanError::Internal {
            stage,
            message: message.into(),
        }
    }
}

// =============================================================================
// ERROR CONVERSIONS
// =============================================================================

impl From<FeatureError> for ScanError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::MalformedUrl(msg) => {
                ScanError::ValidationError(format!("Malformed URL: {}", msg))
            },
        }
    }
}

impl From<FusionError> for ScanError {
    fn from(err: FusionError) -> Self {
        ScanError::internal(ScanStage::Fusion, err.to_string())
    }
}

impl From<validator::ValidationErrors> for ScanError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors
                    .iter()
                    .map(move |e| format!("{}: {}", field, e.message.as_ref().unwrap_or(&e.code)))
            })
            .collect();

        ScanError::ValidationError(messages.join(", "))
    }
}

impl From<JsonRejection> for ScanError {
    fn from(err: JsonRejection) -> Self {
        ScanError::ValidationError(err.body_text())
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ScanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ScanError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScanError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ScanError::ValidationError(_) => "VALIDATION_ERROR",
            ScanError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ScanError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ScanErrorResponse {
        let details = match self {
            ScanError::Internal { stage, .. } => Some(serde_json::json!({ "stage": stage })),
            _ => None,
        };

        ScanErrorResponse {
            error: self.to_string(),
            code: self.error_code().to_string(),
            details,
        }
    }
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_response();

        (status, Json(body)).into_response()
    }
}

pub type ScanApiResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ScanError::ValidationError("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ScanError::ServiceUnavailable("no model".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ScanError::internal(ScanStage::UrlModel, "nan").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_reports_stage() {
        let response = ScanError::internal(ScanStage::UrlModel, "boom").to_response();
        assert_eq!(response.code, "INTERNAL_ERROR");
        assert_eq!(response.details, Some(serde_json::json!({ "stage": "url_model" })));
    }

    #[test]
    fn test_malformed_url_is_validation_error() {
        let err: ScanError = FeatureError::MalformedUrl("relative URL without a base".to_string()).into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_fusion_error_maps_to_fusion_stage() {
        let err: ScanError = FusionError::NonFiniteScore { signal: "content" }.into();
        assert!(matches!(err, ScanError::Internal { stage: ScanStage::Fusion, .. }));
    }
}
