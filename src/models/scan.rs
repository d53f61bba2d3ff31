// Scan request/response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::advisory::{Advisory, HighestSeverity};
use crate::models::features::FeatureVector;

/// Upper bound on page text accepted from callers (characters)
pub const MAX_TEXT_CHARS: usize = 5000;

/// Scores at or above this are phishing / High
pub const PHISHING_THRESHOLD: f64 = 0.70;

/// Scores at or above this (and below `PHISHING_THRESHOLD`) are suspicious / Medium
pub const SUSPICIOUS_THRESHOLD: f64 = 0.40;

// =============================================================================
// VERDICT TYPES
// =============================================================================

/// Final verdict bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Suspicious,
    Phishing,
}

impl Label {
    pub fn from_score(score: f64) -> Self {
        if score >= PHISHING_THRESHOLD {
            Label::Phishing
        } else if score >= SUSPICIOUS_THRESHOLD {
            Label::Suspicious
        } else {
            Label::Legitimate
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Legitimate => write!(f, "legitimate"),
            Label::Suspicious => write!(f, "suspicious"),
            Label::Phishing => write!(f, "phishing"),
        }
    }
}

/// Title-case verdict read by older clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ScanStatus {
    Safe,
    Suspicious,
    Phishing,
}

impl From<Label> for ScanStatus {
    fn from(label: Label) -> Self {
        match label {
            Label::Legitimate => ScanStatus::Safe,
            Label::Suspicious => ScanStatus::Suspicious,
            Label::Phishing => ScanStatus::Phishing,
        }
    }
}

impl Label {
    /// 1 for phishing, 0 otherwise
    pub fn prediction(&self) -> u8 {
        u8::from(*self == Label::Phishing)
    }
}

/// Risk level, bucketed with the same thresholds as `Label`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl From<Label> for RiskLevel {
    fn from(label: Label) -> Self {
        match label {
            Label::Legitimate => RiskLevel::Low,
            Label::Suspicious => RiskLevel::Medium,
            Label::Phishing => RiskLevel::High,
        }
    }
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        Label::from_score(score).into()
    }
}

// =============================================================================
// PAGE SNAPSHOT
// =============================================================================

/// DOM summary of the page the URL points at. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageSnapshot {
    pub num_forms: Option<u32>,
    pub num_inputs: Option<u32>,
    pub num_password_fields: Option<u32>,
    pub num_iframes: Option<u32>,
    pub title: Option<String>,
    #[serde(default)]
    pub form_actions: Vec<String>,
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

/// Classification request sent by the browser extension or dashboard
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "url": "http://paypal-login.secure-account.tk/verify",
    "title": "Verify your account",
    "text": "Your account has been suspended. Verify your account to continue.",
    "numForms": 1,
    "numInputs": 3,
    "numPasswordFields": 1,
    "numIframes": 0,
    "formActions": ["/submit.php"]
}))]
pub struct ScanRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 8192, message = "URL must be 1-8192 characters"))]
    pub url: String,

    /// Any length; only a short excerpt is quoted in reasons
    pub title: Option<String>,

    pub text: Option<String>,

    pub num_forms: Option<u32>,
    pub num_inputs: Option<u32>,
    pub num_password_fields: Option<u32>,
    pub num_iframes: Option<u32>,

    #[serde(default)]
    pub form_actions: Vec<String>,

    /// Raw page HTML; used to derive the snapshot fields that are not given explicitly
    pub html: Option<String>,
}

impl ScanRequest {
    /// Request carrying only a URL
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Trim the URL and cap page text
    pub fn sanitize(&mut self) {
        self.url = self.url.trim().to_string();
        if let Some(text) = self.text.as_mut() {
            if text.chars().count() > MAX_TEXT_CHARS {
                *text = text.chars().take(MAX_TEXT_CHARS).collect();
            }
        }
    }

    /// Explicit DOM fields as a snapshot
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            num_forms: self.num_forms,
            num_inputs: self.num_inputs,
            num_password_fields: self.num_password_fields,
            num_iframes: self.num_iframes,
            title: self.title.clone(),
            form_actions: self.form_actions.clone(),
        }
    }
}

/// Feature breakdown request
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({ "url": "https://example.com" }))]
pub struct ClassifyRequest {
    #[serde(default)]
    pub url: String,
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

/// Complete, immutable outcome of one classification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanResult {
    pub id: Uuid,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub features: FeatureVector,
    pub url_score: f64,
    pub structural_score: f64,
    pub content_score: f64,
    pub final_score: f64,
    /// Same value as `final_score`
    pub risk_score: f64,
    pub risk_pct: u8,
    pub label: Label,
    pub status: ScanStatus,
    pub prediction: u8,
    pub reasons: Vec<String>,
    pub risk_level: RiskLevel,
    pub triggered_count: usize,
    pub highest_severity: HighestSeverity,
    pub advisories: Vec<Advisory>,
    #[serde(default)]
    pub nlp_model_used: bool,
    /// Always true: every result combines URL, structural and content signals
    pub hybrid: bool,
}

/// One row of the feature breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeatureBreakdown {
    pub key: String,
    pub label: String,
    pub value: f64,
    pub importance: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Returned after the scan log is wiped
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearHistoryResponse {
    pub status: String,
    pub count: usize,
}

/// Feature breakdown response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassifyResponse {
    pub url: String,
    pub result: String,
    pub risk_score: f64,
    pub breakdown: Vec<FeatureBreakdown>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_request_accepts_camel_case() {
        let request: ScanRequest = serde_json::from_value(serde_json::json!({
            "url": "https://example.com",
            "numForms": 2,
            "numPasswordFields": 1,
            "formActions": ["/login.php"]
        }))
        .unwrap();

        let snapshot = request.snapshot();
        assert_eq!(snapshot.num_forms, Some(2));
        assert_eq!(snapshot.num_password_fields, Some(1));
        assert_eq!(snapshot.num_iframes, None);
        assert_eq!(snapshot.form_actions, vec!["/login.php".to_string()]);
    }

    #[test]
    fn test_sanitize_caps_text() {
        let mut request = ScanRequest {
            url: "  https://example.com  ".to_string(),
            text: Some("x".repeat(MAX_TEXT_CHARS + 10)),
            ..Default::default()
        };
        request.sanitize();

        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.text.unwrap().chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_empty_url_fails_validation() {
        let request = ScanRequest::for_url("");
        assert!(request.validate().is_err());
        assert!(ScanRequest::for_url("https://example.com").validate().is_ok());
    }

    #[test]
    fn test_label_buckets() {
        assert_eq!(Label::from_score(0.0), Label::Legitimate);
        assert_eq!(Label::from_score(0.3999), Label::Legitimate);
        assert_eq!(Label::from_score(0.40), Label::Suspicious);
        assert_eq!(Label::from_score(0.6999), Label::Suspicious);
        assert_eq!(Label::from_score(0.70), Label::Phishing);
        assert_eq!(RiskLevel::from_score(0.70), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.45), RiskLevel::Medium);
    }

    #[test]
    fn test_status_and_prediction_follow_label() {
        assert_eq!(ScanStatus::from(Label::Legitimate), ScanStatus::Safe);
        assert_eq!(ScanStatus::from(Label::Suspicious), ScanStatus::Suspicious);
        assert_eq!(ScanStatus::from(Label::Phishing), ScanStatus::Phishing);
        assert_eq!(Label::Phishing.prediction(), 1);
        assert_eq!(Label::Suspicious.prediction(), 0);
        assert_eq!(serde_json::to_string(&ScanStatus::Safe).unwrap(), "\"Safe\"");
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(serde_json::to_string(&Label::Phishing).unwrap(), "\"phishing\"");
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"Medium\"");
    }
}
