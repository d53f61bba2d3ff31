// Content analyzer tests
// Keyword scoring must not depend on whether a text classifier is wired in

use async_trait::async_trait;
use phishscan_backend_core::services::content_analysis::{
    keyword_score, ClassifierError, ContentAnalyzer, TextClassifier, MAX_ANALYZED_CHARS,
};
use std::sync::Arc;
use std::time::Duration;

const SUSPENDED_TEXT: &str = "Your account has been suspended. Verify your account to continue.";

struct StubClassifier {
    label: &'static str,
    confidence: f64,
}

#[async_trait]
impl TextClassifier for StubClassifier {
    async fn classify(&self, _text: &str) -> Result<(String, f64), ClassifierError> {
        Ok((self.label.to_string(), self.confidence))
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

struct BrokenClassifier;

#[async_trait]
impl TextClassifier for BrokenClassifier {
    async fn classify(&self, _text: &str) -> Result<(String, f64), ClassifierError> {
        Err(ClassifierError::Status(500))
    }

    fn model_name(&self) -> &str {
        "broken"
    }
}

fn analyzer_with(classifier: Arc<dyn TextClassifier>) -> ContentAnalyzer {
    ContentAnalyzer::new(Some(classifier), Duration::from_secs(1))
}

#[tokio::test]
async fn test_blank_text_scores_zero() {
    let analyzer = analyzer_with(Arc::new(StubClassifier {
        label: "phishing",
        confidence: 0.99,
    }));
    assert_eq!(analyzer.analyze("   \n\t").await, (0.0, vec![]));
    assert_eq!(ContentAnalyzer::keyword_only().analyze("").await, (0.0, vec![]));
}

#[tokio::test]
async fn test_keyword_path_matches_pure_scorer() {
    let (score, reasons) = ContentAnalyzer::keyword_only().analyze(SUSPENDED_TEXT).await;

    assert_eq!((score, reasons.clone()), keyword_score(SUSPENDED_TEXT));
    assert!((score - 0.1).abs() < 1e-12);
    assert_eq!(
        reasons,
        vec!["Urgent/deceptive language detected: verify your account, your account has been".to_string()]
    );
}

#[tokio::test]
async fn test_failed_classifier_equals_disabled_classifier() {
    let disabled = ContentAnalyzer::keyword_only().analyze(SUSPENDED_TEXT).await;
    let failing = analyzer_with(Arc::new(BrokenClassifier))
        .analyze(SUSPENDED_TEXT)
        .await;

    assert_eq!(disabled, failing);
}

#[tokio::test]
async fn test_blend_with_classifier() {
    let analyzer = analyzer_with(Arc::new(StubClassifier {
        label: "LABEL_1",
        confidence: 0.9,
    }));
    let (score, reasons) = analyzer.analyze(SUSPENDED_TEXT).await;

    // 0.7 * 0.9 + 0.3 * 0.1
    assert!((score - 0.66).abs() < 1e-9);
    assert_eq!(reasons[0], "NLP model flagged content as phishing (confidence 90%)");
    assert!(reasons[1].starts_with("Urgent/deceptive language detected"));
}

#[tokio::test]
async fn test_benign_label_inverts_confidence() {
    let analyzer = analyzer_with(Arc::new(StubClassifier {
        label: "legitimate",
        confidence: 0.95,
    }));
    let (score, reasons) = analyzer.analyze("Welcome to our bakery. Fresh bread daily.").await;

    // nlp 0.05, no keywords
    assert!((score - 0.035).abs() < 1e-9);
    assert!(reasons.is_empty());
}

#[test]
fn test_brand_without_urgency_adds_small_bump() {
    let (score, reasons) = keyword_score("Sign in with your Google account");
    assert!((score - 0.05).abs() < 1e-12);
    assert!(reasons.is_empty());
}

#[test]
fn test_brand_with_urgency() {
    let (score, reasons) = keyword_score("PayPal security alert: act now");
    // two urgent phrases + combo
    assert!((score - 0.30).abs() < 1e-9);
    assert_eq!(
        reasons[1],
        "Brand impersonation combined with urgency: paypal"
    );
}

#[test]
fn test_caps_rule_needs_five_distinct_words() {
    let (score, _) = keyword_score("FREE MONEY HERE TODAY HTTP HTTPS");
    assert_eq!(score, 0.0);

    let (score, reasons) = keyword_score("FREE MONEY HERE TODAY ONLY");
    assert!((score - 0.10).abs() < 1e-12);
    assert_eq!(reasons, vec!["Excessive ALL-CAPS text detected (5 instances)".to_string()]);
}

#[tokio::test]
async fn test_text_beyond_limit_is_ignored() {
    let mut text = "a".repeat(MAX_ANALYZED_CHARS);
    text.push_str(" verify your account");

    let (score, reasons) = ContentAnalyzer::keyword_only().analyze(&text).await;
    assert_eq!(score, 0.0);
    assert!(reasons.is_empty());
}
