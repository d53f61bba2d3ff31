// Hybrid fusion of URL, structural and content signals
//
// final = 0.40 * url + 0.30 * structural + 0.30 * content, clamped to [0, 1] and rounded
// to 4 decimals. Reasons are URL-derived clauses first, then structural, then content.

use thiserror::Error;

use crate::models::features::{report, FeatureVector};
use crate::models::scan::{Label, PHISHING_THRESHOLD};

pub const URL_WEIGHT: f64 = 0.40;
pub const STRUCTURAL_WEIGHT: f64 = 0.30;
pub const CONTENT_WEIGHT: f64 = 0.30;

/// Substituted when nothing else explains the verdict
pub const NO_INDICATORS_REASON: &str = "No strong phishing indicators detected";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    #[error("{signal} score is not a finite number")]
    NonFiniteScore { signal: &'static str },
}

/// Scores and explanation produced by fusion
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    pub url_score: f64,
    pub structural_score: f64,
    pub content_score: f64,
    pub final_score: f64,
    pub risk_pct: u8,
    pub label: Label,
    pub reasons: Vec<String>,
}

/// Four decimals, ties to even
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round_ties_even() / 10_000.0
}

pub fn fuse(
    url_score: f64,
    features: &FeatureVector,
    structural_score: f64,
    structural_reasons: Vec<String>,
    content_score: f64,
    content_reasons: Vec<String>,
) -> Result<FusionOutcome, FusionError> {
    for (signal, score) in [
        ("url", url_score),
        ("structural", structural_score),
        ("content", content_score),
    ] {
        if !score.is_finite() {
            return Err(FusionError::NonFiniteScore { signal });
        }
    }

    let combined =
        URL_WEIGHT * url_score + STRUCTURAL_WEIGHT * structural_score + CONTENT_WEIGHT * content_score;
    let final_score = round4(combined.clamp(0.0, 1.0));

    let mut reasons = url_reasons(features, url_score);
    reasons.extend(structural_reasons);
    reasons.extend(content_reasons);
    if reasons.is_empty() {
        reasons.push(NO_INDICATORS_REASON.to_string());
    }

    Ok(FusionOutcome {
        url_score: round4(url_score),
        structural_score: round4(structural_score),
        content_score: round4(content_score),
        final_score,
        risk_pct: (final_score * 100.0).round_ties_even() as u8,
        label: Label::from_score(final_score),
        reasons,
    })
}

/// Clauses explaining the URL signal, in fixed order
pub fn url_reasons(features: &FeatureVector, url_score: f64) -> Vec<String> {
    let mut reasons = Vec::new();

    if features.ip > 0.0 {
        reasons.push("IP address used as hostname (suspicious)".to_string());
    }
    if features.suspicious_tld > 0.0 {
        reasons.push("Suspicious top-level domain detected".to_string());
    }
    if features.shortening_service > 0.0 {
        reasons.push("URL shortening service detected".to_string());
    }
    if features.prefix_suffix > 0.0 {
        reasons.push("Hyphen prefix/suffix pattern in domain".to_string());
    }
    if features.https_token > 0.0 {
        reasons.push("Missing HTTPS (plain HTTP connection)".to_string());
    }
    // an unresolved lookup (2) is not a report match
    if features.statistical_report == report::FLAGGED {
        reasons.push("Domain found in statistical phishing reports".to_string());
    }
    if features.phish_hints >= 2.0 {
        reasons.push(format!(
            "Multiple phishing-hint keywords in URL ({})",
            features.phish_hints as i64
        ));
    }
    if features.length_url > 75.0 {
        reasons.push(format!("Unusually long URL ({} chars)", features.length_url as i64));
    }
    if features.nb_hyphens > 3.0 {
        reasons.push(format!("Excessive hyphens in URL ({})", features.nb_hyphens as i64));
    }

    if reasons.is_empty() && url_score >= PHISHING_THRESHOLD {
        reasons.push("URL model flagged as high-confidence phishing".to_string());
    }

    reasons
}
