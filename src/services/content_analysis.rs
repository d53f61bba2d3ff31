// Page text analysis
// Optional hosted text classifier blended with a keyword heuristic. The keyword path
// never depends on classifier state, so disabling the classifier only removes the blend.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

lazy_static! {
    static ref CAPS_WORD_PATTERN: Regex =
        Regex::new(r"\b[A-Z]{4,}\b").expect("Invalid caps word regex");
}

/// Characters of page text considered by either path
pub const MAX_ANALYZED_CHARS: usize = 2000;

const URGENT_PHRASES: [&str; 41] = [
    "verify your account",
    "confirm your identity",
    "update your information",
    "account suspended",
    "unusual activity",
    "click here to verify",
    "enter your password",
    "login to continue",
    "urgent action required",
    "your account has been",
    "unauthorized access",
    "security alert",
    "act immediately",
    "limited time",
    "expires in",
    "act now",
    "confirm now",
    "validate your",
    "credential",
    "bank details",
    "credit card number",
    "social security",
    "tax refund",
    "claim your",
    "you are a winner",
    "congratulations you",
    "password reset",
    "one-time code",
    "one time password",
    " otp ",
    "authentication code",
    "two-factor",
    "2fa code",
    "do not share",
    "suspicious sign-in",
    "your account will be",
    "missing payment",
    "reactivate your",
    "invoice attached",
    "parcel could not",
    "delivery failed",
];

const IMPERSONATION_TARGETS: [&str; 27] = [
    "paypal",
    "amazon",
    "google",
    "microsoft",
    "apple",
    "facebook",
    "netflix",
    "instagram",
    "twitter",
    "linkedin",
    "dropbox",
    "chase",
    "bank of america",
    "wells fargo",
    "citibank",
    "irs",
    "fedex",
    "ups",
    "dhl",
    "whatsapp",
    "telegram",
    "coinbase",
    "binance",
    "robinhood",
    "venmo",
    "zelle",
    "crypto wallet",
];

const CAPS_STOPLIST: [&str; 5] = ["HTTP", "HTTPS", "HTML", "CSS", "API"];

const PHISHING_LABEL_MARKERS: [&str; 4] = ["PHISH", "MALICIOUS", "1", "LABEL_1"];

// =============================================================================
// TEXT CLASSIFICATION CAPABILITY
// =============================================================================

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Classifier returned status {0}")]
    Status(u16),

    #[error("Classifier returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("Classifier timed out after {0:?}")]
    Timeout(Duration),
}

/// Text classification capability: `(label, confidence)` for a piece of text
#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<(String, f64), ClassifierError>;

    /// Identifier reported in logs and health output
    fn model_name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Flat(Vec<LabelScore>),
    Nested(Vec<Vec<LabelScore>>),
}

impl InferenceResponse {
    fn best(self) -> Option<LabelScore> {
        let scores = match self {
            InferenceResponse::Flat(scores) => scores,
            InferenceResponse::Nested(batches) => batches.into_iter().flatten().collect(),
        };
        scores
            .into_iter()
            .filter(|s| s.score.is_finite())
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

/// Hosted inference endpoint speaking the `{"inputs": text}` protocol
pub struct HttpTextClassifier {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_token: Option<String>,
}

impl HttpTextClassifier {
    /// `{model}` in the endpoint is replaced with the model id
    pub fn new(
        endpoint: &str,
        model: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("PhishScan-ContentAnalyzer/1.0")
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.replace("{model}", model),
            model: model.to_string(),
            api_token,
        })
    }

    /// Build the classifier and probe it once. Any failure disables the capability.
    pub async fn load(
        endpoint: &str,
        model: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Option<Arc<dyn TextClassifier>> {
        let classifier = match Self::new(endpoint, model, api_token, timeout) {
            Ok(classifier) => classifier,
            Err(e) => {
                warn!("Could not build NLP classifier client: {}. Using keyword heuristics.", e);
                return None;
            },
        };

        info!("Probing NLP model {} at {}", model, classifier.endpoint);
        match tokio::time::timeout(timeout, classifier.classify("Welcome to our website.")).await {
            Ok(Ok(_)) => {
                info!("NLP model available: {}", model);
                Some(Arc::new(classifier))
            },
            Ok(Err(e)) => {
                warn!("Could not load NLP model \"{}\": {}. Falling back to keyword heuristics.", model, e);
                None
            },
            Err(_) => {
                warn!(
                    "NLP model \"{}\" did not answer within {:?}. Falling back to keyword heuristics.",
                    model, timeout
                );
                None
            },
        }
    }
}

#[async_trait]
impl TextClassifier for HttpTextClassifier {
    async fn classify(&self, text: &str) -> Result<(String, f64), ClassifierError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "inputs": text }));

        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ClassifierError::Status(response.status().as_u16()));
        }

        let body: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        body.best()
            .map(|best| (best.label, best.score.clamp(0.0, 1.0)))
            .ok_or_else(|| ClassifierError::InvalidResponse("no label scores".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// CONTENT ANALYZER
// =============================================================================

pub struct ContentAnalyzer {
    classifier: Option<Arc<dyn TextClassifier>>,
    timeout: Duration,
}

impl ContentAnalyzer {
    pub fn new(classifier: Option<Arc<dyn TextClassifier>>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
        }
    }

    /// Keyword heuristics only
    pub fn keyword_only() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    pub fn nlp_available(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.classifier.as_deref().map(|c| c.model_name())
    }

    /// Score page text. Blank text scores zero with no reasons.
    pub async fn analyze(&self, text: &str) -> (f64, Vec<String>) {
        if text.trim().is_empty() {
            return (0.0, Vec::new());
        }

        let text: String = text.chars().take(MAX_ANALYZED_CHARS).collect();
        let (kw_score, kw_reasons) = keyword_score(&text);

        let Some(classifier) = self.classifier.as_deref() else {
            return (kw_score, kw_reasons);
        };

        let outcome = match tokio::time::timeout(self.timeout, classifier.classify(&text)).await {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout(self.timeout)),
        };

        match outcome {
            Ok((label, confidence)) => {
                let nlp_score = nlp_score(&label, confidence);
                let mut reasons = nlp_reasons(nlp_score, confidence);
                reasons.extend(kw_reasons);

                let blended = 0.7 * nlp_score + 0.3 * kw_score;
                (blended.clamp(0.0, 1.0), reasons)
            },
            Err(e) => {
                warn!("NLP inference failed, using keyword fallback: {}", e);
                (kw_score, kw_reasons)
            },
        }
    }
}

fn is_phishing_label(label: &str) -> bool {
    let label = label.to_uppercase();
    PHISHING_LABEL_MARKERS.iter().any(|m| label.contains(m))
}

/// Probability of phishing implied by a classifier verdict
pub fn nlp_score(label: &str, confidence: f64) -> f64 {
    if is_phishing_label(label) {
        confidence
    } else {
        1.0 - confidence
    }
}

fn nlp_reasons(nlp_score: f64, confidence: f64) -> Vec<String> {
    let percent = confidence * 100.0;
    if nlp_score >= 0.70 {
        vec![format!("NLP model flagged content as phishing (confidence {:.0}%)", percent)]
    } else if nlp_score >= 0.45 {
        vec![format!("NLP model found suspicious content patterns (confidence {:.0}%)", percent)]
    } else {
        Vec::new()
    }
}

/// Keyword heuristic. Pure function of the text.
pub fn keyword_score(text: &str) -> (f64, Vec<String>) {
    if text.is_empty() {
        return (0.0, Vec::new());
    }

    let lower = text.to_lowercase();
    let mut score = 0.0;
    let mut reasons = Vec::new();

    let urgent: Vec<&str> = URGENT_PHRASES
        .iter()
        .copied()
        .filter(|phrase| lower.contains(phrase))
        .collect();
    if !urgent.is_empty() {
        score += f64::min(0.05 * urgent.len() as f64, 0.45);
        let ellipsis = if urgent.len() > 3 { "…" } else { "" };
        reasons.push(format!(
            "Urgent/deceptive language detected: {}{}",
            urgent[..urgent.len().min(3)].join(", "),
            ellipsis
        ));
    }

    let brands: Vec<&str> = IMPERSONATION_TARGETS
        .iter()
        .copied()
        .filter(|brand| lower.contains(brand))
        .collect();
    if !brands.is_empty() {
        if urgent.is_empty() {
            score += 0.05;
        } else {
            score += 0.20;
            reasons.push(format!(
                "Brand impersonation combined with urgency: {}",
                brands[..brands.len().min(2)].join(", ")
            ));
        }
    }

    let caps: BTreeSet<&str> = CAPS_WORD_PATTERN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|word| !CAPS_STOPLIST.contains(word))
        .collect();
    if caps.len() > 4 {
        score += 0.10;
        reasons.push(format!("Excessive ALL-CAPS text detected ({} instances)", caps.len()));
    }

    (f64::min(score, 1.0), reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedClassifier {
        label: &'static str,
        confidence: f64,
        calls: AtomicUsize,
    }

    impl FixedClassifier {
        fn new(label: &'static str, confidence: f64) -> Self {
            Self {
                label,
                confidence,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<(String, f64), ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((self.label.to_string(), self.confidence))
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl TextClassifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<(String, f64), ClassifierError> {
            Err(ClassifierError::Status(500))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    struct SlowClassifier;

    #[async_trait]
    impl TextClassifier for SlowClassifier {
        async fn classify(&self, _text: &str) -> Result<(String, f64), ClassifierError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(("phishing".to_string(), 1.0))
        }

        fn model_name(&self) -> &str {
            "slow"
        }
    }

    const SCAM_TEXT: &str =
        "Security alert: your PayPal account has been limited. Verify your account and act now.";

    #[test]
    fn test_keyword_urgency_and_brand() {
        let (score, reasons) = keyword_score(SCAM_TEXT);
        // verify your account, security alert, act now
        assert!((score - (0.15 + 0.20)).abs() < 1e-9);
        assert_eq!(
            reasons,
            vec![
                "Urgent/deceptive language detected: verify your account, security alert, act now"
                    .to_string(),
                "Brand impersonation combined with urgency: paypal".to_string(),
            ]
        );
    }

    #[test]
    fn test_keyword_brand_alone() {
        let (score, reasons) = keyword_score("Shop the latest deals on amazon");
        assert!((score - 0.05).abs() < 1e-9);
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_keyword_ellipsis_after_three_matches() {
        let text = "verify your account now, act now, security alert, limited time offer";
        let (score, reasons) = keyword_score(text);
        assert!((score - 0.20).abs() < 1e-9);
        assert!(reasons[0].ends_with('…'));
    }

    #[test]
    fn test_keyword_caps_rule() {
        let (score, reasons) = keyword_score("WARNING FINAL NOTICE PLEASE READ HTTP HTTPS HTML");
        assert!((score - 0.10).abs() < 1e-9);
        assert_eq!(reasons, vec!["Excessive ALL-CAPS text detected (5 instances)".to_string()]);

        let (score, _) = keyword_score("WARNING WARNING WARNING FINAL NOTICE");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_phishing_label_markers() {
        assert!(is_phishing_label("phishing"));
        assert!(is_phishing_label("LABEL_1"));
        assert!(is_phishing_label("malicious_url"));
        assert!(!is_phishing_label("safe"));
        assert!(!is_phishing_label("LABEL_0"));
        assert!((nlp_score("legitimate", 0.8) - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_blank_text_short_circuits() {
        let classifier = Arc::new(FixedClassifier::new("phishing", 0.99));
        let shared: Arc<dyn TextClassifier> = classifier.clone();
        let analyzer = ContentAnalyzer::new(Some(shared), Duration::from_secs(1));

        assert_eq!(analyzer.analyze("   \n").await, (0.0, Vec::new()));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blend_with_classifier() {
        let analyzer = ContentAnalyzer::new(
            Some(Arc::new(FixedClassifier::new("phishing", 0.9))),
            Duration::from_secs(1),
        );

        let (score, reasons) = analyzer.analyze(SCAM_TEXT).await;
        assert!((score - (0.7 * 0.9 + 0.3 * 0.35)).abs() < 1e-9);
        assert_eq!(reasons[0], "NLP model flagged content as phishing (confidence 90%)");
        assert_eq!(reasons.len(), 3);
    }

    #[tokio::test]
    async fn test_suspicious_band_reason() {
        let analyzer = ContentAnalyzer::new(
            Some(Arc::new(FixedClassifier::new("safe", 0.5))),
            Duration::from_secs(1),
        );

        let (_, reasons) = analyzer.analyze("hello there").await;
        assert_eq!(reasons, vec!["NLP model found suspicious content patterns (confidence 50%)".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_keywords() {
        let analyzer = ContentAnalyzer::new(Some(Arc::new(FailingClassifier)), Duration::from_secs(1));
        assert_eq!(analyzer.analyze(SCAM_TEXT).await, keyword_score(SCAM_TEXT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_to_keywords() {
        let analyzer = ContentAnalyzer::new(Some(Arc::new(SlowClassifier)), Duration::from_millis(100));
        assert_eq!(analyzer.analyze(SCAM_TEXT).await, keyword_score(SCAM_TEXT));
    }

    #[tokio::test]
    async fn test_truncates_before_keyword_scan() {
        let text = format!("{}verify your account", "x".repeat(MAX_ANALYZED_CHARS));
        let (score, reasons) = ContentAnalyzer::keyword_only().analyze(&text).await;
        assert_eq!(score, 0.0);
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_inference_response_shapes() {
        let flat: InferenceResponse =
            serde_json::from_str(r#"[{"label":"safe","score":0.2},{"label":"phishing","score":0.8}]"#)
                .unwrap();
        assert_eq!(flat.best().unwrap().label, "phishing");

        let nested: InferenceResponse =
            serde_json::from_str(r#"[[{"label":"LABEL_0","score":0.7},{"label":"LABEL_1","score":0.3}]]"#)
                .unwrap();
        assert_eq!(nested.best().unwrap().label, "LABEL_0");
    }
}
