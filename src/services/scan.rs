// Scan pipeline
// request -> features -> URL model -> {structural, content} -> fusion + advisories -> history

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::models::features::{is_structural, FeatureVector};
use crate::models::scan::{ClassifyResponse, FeatureBreakdown, ScanRequest, ScanResult};
use crate::services::attack_knowledge::{self, feature_label};
use crate::services::content_analysis::ContentAnalyzer;
use crate::services::feature_extraction::FeatureExtractor;
use crate::services::hybrid_fusion::{self, round4};
use crate::services::oracle::UrlRiskOracle;
use crate::services::scan_history::ScanHistoryStore;
use crate::services::structural_analysis::{self, merge_snapshots, snapshot_from_html};
use crate::utils::audit_logger::AuditLogger;
use crate::utils::scan_errors::{ScanError, ScanStage};

/// Probability at or above which the breakdown endpoint reports "Phishing"
const CLASSIFY_THRESHOLD: f64 = 0.5;

/// Reject anything that is not an absolute http(s) URL
pub fn validate_scan_url(url: &str) -> Result<(), ScanError> {
    if url.is_empty() {
        return Err(ScanError::ValidationError("Missing required field: url".to_string()));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ScanError::ValidationError(
            "URL must start with 'http://' or 'https://'".to_string(),
        ));
    }
    Ok(())
}

pub struct ScanService {
    oracle: Option<Arc<dyn UrlRiskOracle>>,
    extractor: FeatureExtractor,
    content: ContentAnalyzer,
    history: Arc<ScanHistoryStore>,
}

impl ScanService {
    pub fn new(
        oracle: Option<Arc<dyn UrlRiskOracle>>,
        extractor: FeatureExtractor,
        content: ContentAnalyzer,
        history: Arc<ScanHistoryStore>,
    ) -> Self {
        Self {
            oracle,
            extractor,
            content,
            history,
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn nlp_model_used(&self) -> bool {
        self.content.nlp_available()
    }

    pub fn nlp_model_name(&self) -> Option<&str> {
        self.content.model_name()
    }

    pub fn history(&self) -> &Arc<ScanHistoryStore> {
        &self.history
    }

    fn oracle(&self) -> Result<&dyn UrlRiskOracle, ScanError> {
        self.oracle.as_deref().ok_or_else(|| {
            ScanError::ServiceUnavailable("Model not loaded. Train and export the URL model first.".to_string())
        })
    }

    async fn url_signal(&self, oracle: &dyn UrlRiskOracle, url: &str) -> Result<(FeatureVector, f64), ScanError> {
        let features = self.extractor.extract(url).await?;

        let probability = oracle.predict_proba(&features);
        if !probability.is_finite() {
            return Err(ScanError::internal(
                ScanStage::UrlModel,
                format!("model returned a non-finite probability for {}", url),
            ));
        }

        Ok((features, probability.clamp(0.0, 1.0)))
    }

    /// Classify a URL with its optional page snapshot. Either a complete result is
    /// returned and recorded, or an error and nothing is recorded.
    pub async fn scan(&self, mut request: ScanRequest) -> Result<ScanResult, ScanError> {
        let oracle = self.oracle()?;

        request.sanitize();
        validate_scan_url(&request.url)?;
        request.validate()?;

        let (features, url_score) = self.url_signal(oracle, &request.url).await?;

        let mut snapshot = request.snapshot();
        if let Some(html) = request.html.as_deref() {
            snapshot = merge_snapshots(snapshot, snapshot_from_html(html));
        }
        let text = request.text.as_deref().unwrap_or("");

        let ((structural_score, structural_reasons), (content_score, content_reasons)) = tokio::join!(
            async { structural_analysis::analyze(&snapshot) },
            self.content.analyze(text)
        );

        let fused = hybrid_fusion::fuse(
            url_score,
            &features,
            structural_score,
            structural_reasons,
            content_score,
            content_reasons,
        )?;

        let advisories = attack_knowledge::advise(&features);
        let result = ScanResult {
            id: Uuid::new_v4(),
            url: request.url,
            timestamp: Utc::now(),
            features,
            url_score: fused.url_score,
            structural_score: fused.structural_score,
            content_score: fused.content_score,
            final_score: fused.final_score,
            risk_score: fused.final_score,
            risk_pct: fused.risk_pct,
            label: fused.label,
            status: fused.label.into(),
            prediction: fused.label.prediction(),
            reasons: fused.reasons,
            risk_level: attack_knowledge::risk_level(fused.final_score),
            triggered_count: advisories.len(),
            highest_severity: attack_knowledge::highest_severity(&advisories),
            advisories,
            nlp_model_used: self.content.nlp_available(),
            hybrid: true,
        };

        info!(
            "URL={} label={} final={:.4} url={:.4} structural={:.4} content={:.4}",
            result.url,
            result.label,
            result.final_score,
            result.url_score,
            result.structural_score,
            result.content_score
        );

        self.history.record(result.clone()).await;
        AuditLogger::log_scan(&result);

        Ok(result)
    }

    /// Model probability with a per-feature breakdown, most important first
    pub async fn classify(&self, url: &str) -> Result<ClassifyResponse, ScanError> {
        let oracle = self.oracle()?;

        let url = url.trim();
        validate_scan_url(url)?;

        let (features, probability) = self.url_signal(oracle, url).await?;
        let importances = oracle.feature_importances();

        let mut breakdown: Vec<FeatureBreakdown> = features
            .iter()
            .zip(importances)
            .map(|((name, value), importance)| FeatureBreakdown {
                key: name.to_string(),
                label: feature_label(name).to_string(),
                value: round4(value),
                importance: round4(importance),
                kind: if is_structural(name) { "structural" } else { "statistical" }.to_string(),
            })
            .collect();
        // stable
        breakdown.sort_by(|a, b| b.importance.total_cmp(&a.importance));

        let result = if probability >= CLASSIFY_THRESHOLD {
            "Phishing"
        } else {
            "Legitimate"
        };
        debug!("Classified {} as {} ({:.4})", url, result, probability);
        AuditLogger::log_classification(url, probability);

        Ok(ClassifyResponse {
            url: url.to_string(),
            result: result.to_string(),
            risk_score: (probability * 1000.0).round_ties_even() / 10.0,
            breakdown,
        })
    }
}
