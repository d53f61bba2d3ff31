// Library exports for the PhishScan backend
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use models::{FeatureVector, Label, RiskLevel, ScanRequest, ScanResult, FEATURE_NAMES};
pub use services::{
    ContentAnalyzer, DisabledResolver, DnsReputationResolver, DomainParser, FeatureExtractor,
    ForestOracle, HttpTextClassifier, ReputationResolver, ScanHistoryStore, ScanService,
    TextClassifier, UrlRiskOracle,
};
pub use utils::{ScanError, ScanStage};

// Re-export handler route builders
pub use handlers::{docs_routes, history_routes, scan_routes};

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use services::domain_parts::DomainParserError;

// Library initialization function
// Loads every capability once; only an unusable public suffix list is fatal
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState, DomainParserError> {
    // URL risk model
    info!("Loading URL model from {}...", config.model.url_model_path);
    let oracle: Option<Arc<dyn UrlRiskOracle>> =
        match ForestOracle::from_path(&config.model.url_model_path) {
            Ok(oracle) => Some(Arc::new(oracle)),
            Err(e) => {
                warn!("{}. Scan requests will be rejected until a model is exported.", e);
                None
            },
        };

    // Feature extraction
    let domains = Arc::new(DomainParser::load(
        config.model.public_suffix_list_path.as_deref(),
    )?);
    let resolver: Arc<dyn ReputationResolver> = if config.model.enable_dns_reputation {
        Arc::new(DnsReputationResolver::new(config.model.dns_lookup_timeout()))
    } else {
        info!("DNS reputation lookups disabled");
        Arc::new(DisabledResolver)
    };
    let extractor = FeatureExtractor::new(domains, resolver);

    // Optional text classifier
    let classifier = match config.nlp.classifier_url.as_deref() {
        Some(endpoint) => {
            HttpTextClassifier::load(
                endpoint,
                &config.nlp.model,
                config.nlp.api_token.clone(),
                config.nlp.timeout(),
            )
            .await
        },
        None => {
            info!("NLP_CLASSIFIER_URL not set. Using keyword heuristics.");
            None
        },
    };
    let content = ContentAnalyzer::new(classifier, config.nlp.timeout());

    // Scan history
    let history = Arc::new(ScanHistoryStore::load(
        config.history.path.clone(),
        config.history.capacity,
    ));

    let scan_service = Arc::new(ScanService::new(oracle, extractor, content, history));

    Ok(AppState {
        config: Arc::new(config.clone()),
        scan_service,
    })
}

/// Assemble the HTTP router
pub fn build_router(state: AppState) -> Router {
    let mut api = Router::new()
        .route("/health", get(health_check))
        .merge(scan_routes())
        .merge(history_routes());

    if state.config.features.enable_api_docs {
        api = api.merge(docs_routes());
    }

    Router::new()
        .route("/", get(index))
        .nest("/api/v1", api)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::dynamic_cors_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Service index
pub async fn index() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "service": "PhishScan Hybrid Detection API",
        "status": "running",
        "endpoints": {
            "scan": "POST /api/v1/scan",
            "classify": "POST /api/v1/classify",
            "history": "GET /api/v1/history",
            "clear_history": "DELETE /api/v1/history",
            "health": "GET /api/v1/health"
        },
        "example": {
            "url": "http://paypal-login.secure-account.tk/verify",
            "title": "Verify your account",
            "text": "Your account has been suspended. Verify your account to continue.",
            "numForms": 1,
            "numInputs": 3,
            "numPasswordFields": 1,
            "numIframes": 0,
            "formActions": ["/submit.php"]
        }
    }))
}

// Health check handler
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    operation_id = "healthCheck",
    responses(
        (status = 200, description = "URL model loaded"),
        (status = 503, description = "URL model missing, scans are rejected")
    )
)]
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>
) -> impl axum::response::IntoResponse {
    use axum::http::StatusCode;
    use axum::Json;

    let service = &state.scan_service;
    let overall_healthy = service.model_loaded();
    let timestamp = chrono::Utc::now().to_rfc3339();

    let response = serde_json::json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "service": "phishscan-backend",
        "timestamp": timestamp,
        "model_loaded": service.model_loaded(),
        "nlp_model_used": service.nlp_model_used(),
        "nlp_model": service.nlp_model_name(),
        "feature_count": models::FEATURE_COUNT,
        "feature_names": FEATURE_NAMES,
        "history_size": service.history().len().await
    });

    if overall_healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
