// Attack knowledge advisory engine
// Static explanations for every URL feature plus the thresholds that decide when a
// feature counts as triggered.

use crate::models::advisory::{Advisory, HighestSeverity, Severity};
use crate::models::features::{is_structural, FeatureVector, FEATURE_COUNT};
use crate::models::scan::RiskLevel;

// =============================================================================
// KNOWLEDGE TABLE
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct AttackKnowledge {
    pub feature: &'static str,
    pub explanation: &'static str,
    pub risk: &'static str,
    pub possible_attacks: &'static [&'static str],
    pub severity: Severity,
}

impl AttackKnowledge {
    fn to_advisory(self) -> Advisory {
        Advisory {
            feature: self.feature.to_string(),
            explanation: self.explanation.to_string(),
            risk: self.risk.to_string(),
            possible_attacks: self.possible_attacks.iter().map(|a| a.to_string()).collect(),
            severity: self.severity,
        }
    }
}

/// One entry per feature, in canonical feature order
pub static KNOWLEDGE_BASE: [AttackKnowledge; FEATURE_COUNT] = [
    // structural
    AttackKnowledge {
        feature: "ip",
        explanation: "The URL uses a raw IP address (like 192.168.1.1) instead of a domain name.",
        risk: "Real websites almost never use raw IP addresses. Attackers use IPs to avoid domain blacklists and hide their identity.",
        possible_attacks: &[
            "Phishing redirection",
            "Man-in-the-Middle attack",
            "Malware injection",
            "Botnet hosting",
        ],
        severity: Severity::High,
    },
    AttackKnowledge {
        feature: "https_token",
        explanation: "The website uses HTTP instead of HTTPS, meaning the connection is NOT encrypted.",
        risk: "Everything you type on this site (passwords, card numbers) is sent in plain text. Anyone on the same network can intercept it.",
        possible_attacks: &[
            "Man-in-the-Middle attack",
            "Session hijacking",
            "Data interception",
            "Credential theft",
        ],
        severity: Severity::High,
    },
    AttackKnowledge {
        feature: "prefix_suffix",
        explanation: "The domain name contains a hyphen (e.g. paypal-login.com, secure-bank.net).",
        risk: "Attackers add hyphens to make fake domains look similar to real brands and trick users into trusting them.",
        possible_attacks: &[
            "Brand impersonation",
            "Fake login portal",
            "Social engineering attack",
            "Credential theft",
        ],
        severity: Severity::Medium,
    },
    AttackKnowledge {
        feature: "shortening_service",
        explanation: "The URL uses a link shortener like bit.ly, tinyurl, or similar services.",
        risk: "Shortened links completely hide the real destination. You cannot know where you are being sent before clicking.",
        possible_attacks: &[
            "Phishing redirection",
            "Hidden redirect attack",
            "Malware injection",
            "Drive-by download",
        ],
        severity: Severity::High,
    },
    AttackKnowledge {
        feature: "suspicious_tld",
        explanation: "The website uses a top-level domain (TLD) commonly associated with phishing attacks (e.g. .tk, .ml, .xyz, .win, .click).",
        risk: "Many free or very cheap TLDs are heavily abused by attackers because they require no identity verification and cost almost nothing.",
        possible_attacks: &[
            "Scam landing page",
            "Phishing redirection",
            "Fake login portal",
            "Malicious redirection",
        ],
        severity: Severity::High,
    },
    AttackKnowledge {
        feature: "statistical_report",
        explanation: "The domain or IP address has been previously flagged in security threat intelligence databases.",
        risk: "This URL has a documented history of hosting malicious or deceptive content according to threat databases.",
        possible_attacks: &[
            "Known phishing campaign",
            "Malware distribution",
            "Botnet hosting",
            "Drive-by download",
        ],
        severity: Severity::High,
    },
    // statistical
    AttackKnowledge {
        feature: "length_url",
        explanation: "The URL is unusually long compared to normal websites.",
        risk: "Attackers make URLs very long to hide the real destination, overflow browser displays, and confuse security scanners.",
        possible_attacks: &[
            "URL obfuscation",
            "Obfuscation attack",
            "Hidden redirect attack",
            "Phishing redirection",
        ],
        severity: Severity::Medium,
    },
    AttackKnowledge {
        feature: "length_hostname",
        explanation: "The domain/hostname part of the URL is very long.",
        risk: "Long hostnames are used to embed fake brand names (like \"paypal.secure-login.com\") to fool users into thinking they are on a real site.",
        possible_attacks: &[
            "Brand impersonation",
            "URL obfuscation",
            "Social engineering attack",
            "Fake login portal",
        ],
        severity: Severity::Medium,
    },
    AttackKnowledge {
        feature: "nb_dots",
        explanation: "The URL contains an unusually large number of dots (.).",
        risk: "More dots mean more subdomains. Attackers stack subdomains like \"apple.paypal.secure.login.evil.com\" to make fake sites look real.",
        possible_attacks: &[
            "Subdomain spoofing",
            "Brand impersonation",
            "DNS spoofing",
            "Phishing redirection",
        ],
        severity: Severity::Medium,
    },
    AttackKnowledge {
        feature: "nb_hyphens",
        explanation: "The URL contains many hyphens (-).",
        risk: "Multiple hyphens are used as visual tricks to make fake domains look like real brand names at a quick glance.",
        possible_attacks: &[
            "Brand impersonation",
            "Social engineering attack",
            "Fake login portal",
            "Credential theft",
        ],
        severity: Severity::Medium,
    },
    AttackKnowledge {
        feature: "nb_qm",
        explanation: "The URL contains multiple question marks (query parameters).",
        risk: "Multiple query parameters can pass hidden tracking data, redirect targets, or session tokens that attackers can steal.",
        possible_attacks: &[
            "URL obfuscation",
            "Token theft",
            "Session hijacking",
            "Phishing redirection",
        ],
        severity: Severity::Low,
    },
    AttackKnowledge {
        feature: "nb_percent",
        explanation: "The URL contains percent-encoded characters (%) used to hide its true content.",
        risk: "Percent encoding can disguise malicious characters, bypass URL filters, or hide the real destination of a redirect.",
        possible_attacks: &[
            "URL obfuscation",
            "Obfuscation attack",
            "Hidden redirect attack",
            "Malicious redirection",
        ],
        severity: Severity::Medium,
    },
    AttackKnowledge {
        feature: "nb_slash",
        explanation: "The URL has an unusually high number of forward slashes, making it very deeply nested.",
        risk: "Deeply nested paths are often a sign of obfuscation designed to hide the real file or destination being accessed.",
        possible_attacks: &[
            "URL obfuscation",
            "Phishing redirection",
            "Hidden redirect attack",
            "Drive-by download",
        ],
        severity: Severity::Low,
    },
    AttackKnowledge {
        feature: "nb_www",
        explanation: "The URL contains more than one occurrence of \"www\".",
        risk: "Real websites only have \"www\" once. Duplicating it is a known trick to make fake sites look like legitimate www domains.",
        possible_attacks: &[
            "Brand impersonation",
            "URL obfuscation",
            "Fake login portal",
            "Social engineering attack",
        ],
        severity: Severity::Medium,
    },
    AttackKnowledge {
        feature: "ratio_digits_url",
        explanation: "A large portion of the URL consists of numbers.",
        risk: "Randomly generated or machine-created phishing URLs tend to have lots of numbers to avoid pattern-based detection systems.",
        possible_attacks: &[
            "URL obfuscation",
            "Obfuscation attack",
            "Phishing redirection",
            "Malware injection",
        ],
        severity: Severity::Medium,
    },
    AttackKnowledge {
        feature: "ratio_digits_host",
        explanation: "The hostname itself contains too many numeric digits.",
        risk: "IP-like or randomly generated hostnames with many numbers are used by attackers to avoid domain-name blacklists.",
        possible_attacks: &[
            "URL obfuscation",
            "Phishing redirection",
            "Botnet hosting",
            "DNS spoofing",
        ],
        severity: Severity::Medium,
    },
    AttackKnowledge {
        feature: "char_repeat",
        explanation: "The URL contains repeated character sequences (e.g. \"aaaa\", \"xxxxx\").",
        risk: "Attackers use repeated characters to pad URLs, confuse automated scanners, or fill space in obfuscated fake addresses.",
        possible_attacks: &[
            "Obfuscation attack",
            "URL obfuscation",
            "Social engineering attack",
            "Malicious redirection",
        ],
        severity: Severity::Low,
    },
    AttackKnowledge {
        feature: "avg_words_raw",
        explanation: "The average length of words in the full URL is unusually short.",
        risk: "Machine-generated phishing domains often use very short or meaningless word fragments that are hard to read or remember.",
        possible_attacks: &[
            "Phishing redirection",
            "Scam landing page",
            "Brand impersonation",
            "Social engineering attack",
        ],
        severity: Severity::Low,
    },
    AttackKnowledge {
        feature: "avg_word_host",
        explanation: "The average length of words in the hostname is unusually short.",
        risk: "Randomly generated phishing domains typically have very short, meaningless hostname segments.",
        possible_attacks: &[
            "Brand impersonation",
            "Fake login portal",
            "Phishing redirection",
            "Social engineering attack",
        ],
        severity: Severity::Low,
    },
    AttackKnowledge {
        feature: "avg_word_path",
        explanation: "The average length of words in the URL path is very short.",
        risk: "Short URL path words suggest machine-generated or auto-created phishing pages used in large-scale automated attacks.",
        possible_attacks: &[
            "Phishing redirection",
            "Scam landing page",
            "Malicious redirection",
            "Drive-by download",
        ],
        severity: Severity::Low,
    },
    AttackKnowledge {
        feature: "phish_hints",
        explanation: "The URL contains phishing keywords like \"login\", \"verify\", \"secure\", \"admin\", \"account\", \"update\".",
        risk: "Attackers deliberately use these words to make fake pages look like official login or account management pages of real brands.",
        possible_attacks: &[
            "Credential theft",
            "Account takeover",
            "Fake login portal",
            "Social engineering attack",
        ],
        severity: Severity::High,
    },
];

// =============================================================================
// THRESHOLDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdDirection {
    /// Triggered when value > threshold
    AboveTriggers,
    /// Triggered when 0 < value < threshold
    BelowTriggers,
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdRule {
    pub feature: &'static str,
    pub direction: ThresholdDirection,
    pub threshold: f64,
}

const fn above(feature: &'static str, threshold: f64) -> ThresholdRule {
    ThresholdRule {
        feature,
        direction: ThresholdDirection::AboveTriggers,
        threshold,
    }
}

const fn below(feature: &'static str, threshold: f64) -> ThresholdRule {
    ThresholdRule {
        feature,
        direction: ThresholdDirection::BelowTriggers,
        threshold,
    }
}

/// Statistical features that participate in threshold triggering
pub static THRESHOLDS: [ThresholdRule; 15] = [
    above("length_url", 75.0),
    above("length_hostname", 25.0),
    above("nb_dots", 4.0),
    above("nb_hyphens", 3.0),
    above("nb_qm", 1.0),
    above("nb_percent", 2.0),
    above("nb_slash", 6.0),
    above("nb_www", 1.0),
    above("ratio_digits_url", 0.15),
    above("ratio_digits_host", 0.10),
    above("char_repeat", 0.0),
    below("avg_words_raw", 4.0),
    below("avg_word_host", 5.0),
    below("avg_word_path", 3.0),
    above("phish_hints", 0.0),
];

/// Display labels used by the feature breakdown
static FEATURE_LABELS: [(&str, &str); FEATURE_COUNT] = [
    ("ip", "IP Address in URL"),
    ("https_token", "HTTPS Token in Domain"),
    ("prefix_suffix", "Prefix/Suffix (-) in Domain"),
    ("shortening_service", "URL Shortening Service"),
    ("suspicious_tld", "Suspicious TLD"),
    ("statistical_report", "Listed in Blacklist"),
    ("length_url", "URL Length"),
    ("length_hostname", "Hostname Length"),
    ("nb_dots", "Number of Dots"),
    ("nb_hyphens", "Number of Hyphens"),
    ("nb_qm", "Number of ? Chars"),
    ("nb_percent", "Number of % Chars"),
    ("nb_slash", "Number of Slashes"),
    ("nb_www", "Number of www"),
    ("ratio_digits_url", "Digit Ratio in URL"),
    ("ratio_digits_host", "Digit Ratio in Hostname"),
    ("char_repeat", "Repeated Characters"),
    ("avg_words_raw", "Avg Word Length (URL)"),
    ("avg_word_host", "Avg Word Length (Host)"),
    ("avg_word_path", "Avg Word Length (Path)"),
    ("phish_hints", "Phishing Hint Words"),
];

pub fn knowledge_for(feature: &str) -> Option<&'static AttackKnowledge> {
    KNOWLEDGE_BASE.iter().find(|k| k.feature == feature)
}

pub fn threshold_for(feature: &str) -> Option<&'static ThresholdRule> {
    THRESHOLDS.iter().find(|t| t.feature == feature)
}

/// Human-readable label, falling back to the raw feature name
pub fn feature_label(feature: &str) -> &str {
    FEATURE_LABELS
        .iter()
        .find(|(name, _)| *name == feature)
        .map(|(_, label)| *label)
        .unwrap_or(feature)
}

// =============================================================================
// ADVISORY ENGINE
// =============================================================================

pub fn is_triggered(feature: &str, value: f64) -> bool {
    if is_structural(feature) {
        return value > 0.0;
    }

    match threshold_for(feature) {
        Some(rule) => match rule.direction {
            ThresholdDirection::AboveTriggers => value > rule.threshold,
            ThresholdDirection::BelowTriggers => value > 0.0 && value < rule.threshold,
        },
        None => false,
    }
}

/// Advisories for every triggered feature, High first. Equal severities keep
/// knowledge-table order.
pub fn advise(features: &FeatureVector) -> Vec<Advisory> {
    let mut triggered: Vec<&AttackKnowledge> = KNOWLEDGE_BASE
        .iter()
        .filter(|k| {
            features
                .get(k.feature)
                .map(|value| is_triggered(k.feature, value))
                .unwrap_or(false)
        })
        .collect();

    // stable
    triggered.sort_by(|a, b| b.severity.cmp(&a.severity));

    triggered.into_iter().map(|k| k.to_advisory()).collect()
}

pub fn risk_level(final_score: f64) -> RiskLevel {
    RiskLevel::from_score(final_score)
}

pub fn highest_severity(advisories: &[Advisory]) -> HighestSeverity {
    advisories
        .iter()
        .map(|a| a.severity)
        .max()
        .map(HighestSeverity::from)
        .unwrap_or(HighestSeverity::None)
}
