// Common test utilities and helper structs
// Shared across all test files to avoid duplication
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use chrono::Utc;
use phishscan_backend_core::{
    app::AppState,
    app_config::{AppConfig, Environment},
    models::{
        advisory::HighestSeverity,
        features::{FeatureVector, FEATURE_COUNT},
        scan::{Label, RiskLevel, ScanResult, ScanStatus},
    },
    services::{
        ContentAnalyzer, DisabledResolver, DomainParser, FeatureExtractor, ReputationResolver,
        ScanHistoryStore, ScanService, UrlRiskOracle,
    },
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use uuid::Uuid;

pub const PHISHY_URL: &str = "http://paypal-login.secure-account.tk/verify";

/// Oracle that returns a fixed probability
pub struct ConstantOracle(pub f64);

impl UrlRiskOracle for ConstantOracle {
    fn predict_proba(&self, _features: &FeatureVector) -> f64 {
        self.0
    }

    fn feature_importances(&self) -> [f64; FEATURE_COUNT] {
        [1.0 / FEATURE_COUNT as f64; FEATURE_COUNT]
    }
}

/// Resolver that always answers with the same address
pub struct FixedResolver(pub Option<Ipv4Addr>);

#[async_trait]
impl ReputationResolver for FixedResolver {
    async fn resolve_ipv4(&self, _domain: &str) -> Option<Ipv4Addr> {
        self.0
    }
}

pub fn domain_parser() -> Arc<DomainParser> {
    Arc::new(DomainParser::embedded().expect("embedded public suffix list"))
}

pub fn offline_extractor() -> FeatureExtractor {
    FeatureExtractor::new(domain_parser(), Arc::new(DisabledResolver))
}

pub fn scan_service(
    oracle: Option<Arc<dyn UrlRiskOracle>>,
    history: Arc<ScanHistoryStore>,
) -> ScanService {
    ScanService::new(oracle, offline_extractor(), ContentAnalyzer::keyword_only(), history)
}

/// Test config with wildcard CORS and docs enabled
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::from_env().expect("Failed to load test config");
    config.environment = Environment::Test;
    config.security.cors_allowed_origins = vec!["*".to_string()];
    config.features.enable_api_docs = true;
    config
}

pub fn test_state(oracle: Option<Arc<dyn UrlRiskOracle>>) -> AppState {
    let history = Arc::new(ScanHistoryStore::in_memory(50));
    AppState {
        config: Arc::new(test_config()),
        scan_service: Arc::new(scan_service(oracle, history)),
    }
}

pub fn test_router(oracle: Option<Arc<dyn UrlRiskOracle>>) -> Router {
    phishscan_backend_core::build_router(test_state(oracle))
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    serde_json::from_slice(&bytes).expect("JSON body")
}

/// Minimal recorded scan
pub fn sample_result(url: &str) -> ScanResult {
    ScanResult {
        id: Uuid::new_v4(),
        url: url.to_string(),
        timestamp: Utc::now(),
        features: FeatureVector::default(),
        url_score: 0.1,
        structural_score: 0.0,
        content_score: 0.0,
        final_score: 0.04,
        risk_score: 0.04,
        risk_pct: 4,
        label: Label::Legitimate,
        status: ScanStatus::Safe,
        prediction: 0,
        reasons: vec!["No strong phishing indicators detected".to_string()],
        risk_level: RiskLevel::Low,
        triggered_count: 0,
        highest_severity: HighestSeverity::None,
        advisories: vec![],
        nlp_model_used: false,
        hybrid: true,
    }
}
