// URL feature vector
// Field order is the input order the URL risk model was trained on. Serialization,
// `to_array` and FEATURE_NAMES must all agree; the tests below pin that down.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of features consumed by the URL risk oracle
pub const FEATURE_COUNT: usize = 21;

/// Number of leading structural (binary / ternary) features
pub const STRUCTURAL_FEATURE_COUNT: usize = 6;

/// Canonical feature order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // structural
    "ip",
    "https_token",
    "prefix_suffix",
    "shortening_service",
    "suspicious_tld",
    "statistical_report",
    // statistical
    "length_url",
    "length_hostname",
    "nb_dots",
    "nb_hyphens",
    "nb_qm",
    "nb_percent",
    "nb_slash",
    "nb_www",
    "ratio_digits_url",
    "ratio_digits_host",
    "char_repeat",
    "avg_words_raw",
    "avg_word_host",
    "avg_word_path",
    "phish_hints",
];

/// `statistical_report` values
pub mod report {
    /// Reputation checked, nothing matched
    pub const CLEAN: f64 = 0.0;
    /// URL pattern or resolved IP is blacklisted
    pub const FLAGGED: f64 = 1.0;
    /// Resolution failed, reputation unknown
    pub const UNRESOLVED: f64 = 2.0;
}

/// Whether a feature belongs to the structural group
pub fn is_structural(name: &str) -> bool {
    FEATURE_NAMES[..STRUCTURAL_FEATURE_COUNT].contains(&name)
}

/// Lexical summary of a single URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeatureVector {
    pub ip: f64,
    pub https_token: f64,
    pub prefix_suffix: f64,
    pub shortening_service: f64,
    pub suspicious_tld: f64,
    pub statistical_report: f64,
    pub length_url: f64,
    pub length_hostname: f64,
    pub nb_dots: f64,
    pub nb_hyphens: f64,
    pub nb_qm: f64,
    pub nb_percent: f64,
    pub nb_slash: f64,
    pub nb_www: f64,
    pub ratio_digits_url: f64,
    pub ratio_digits_host: f64,
    pub char_repeat: f64,
    pub avg_words_raw: f64,
    pub avg_word_host: f64,
    pub avg_word_path: f64,
    pub phish_hints: f64,
}

impl FeatureVector {
    /// Values in canonical order, ready for the oracle
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.ip,
            self.https_token,
            self.prefix_suffix,
            self.shortening_service,
            self.suspicious_tld,
            self.statistical_report,
            self.length_url,
            self.length_hostname,
            self.nb_dots,
            self.nb_hyphens,
            self.nb_qm,
            self.nb_percent,
            self.nb_slash,
            self.nb_www,
            self.ratio_digits_url,
            self.ratio_digits_host,
            self.char_repeat,
            self.avg_words_raw,
            self.avg_word_host,
            self.avg_word_path,
            self.phish_hints,
        ]
    }

    /// Build from canonical-order values
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [ip, https_token, prefix_suffix, shortening_service, suspicious_tld, statistical_report, length_url, length_hostname, nb_dots, nb_hyphens, nb_qm, nb_percent, nb_slash, nb_www, ratio_digits_url, ratio_digits_host, char_repeat, avg_words_raw, avg_word_host, avg_word_path, phish_hints] =
            values;

        Self {
            ip,
            https_token,
            prefix_suffix,
            shortening_service,
            suspicious_tld,
            statistical_report,
            length_url,
            length_hostname,
            nb_dots,
            nb_hyphens,
            nb_qm,
            nb_percent,
            nb_slash,
            nb_www,
            ratio_digits_url,
            ratio_digits_host,
            char_repeat,
            avg_words_raw,
            avg_word_host,
            avg_word_path,
            phish_hints,
        }
    }

    /// Look a feature up by name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|index| self.to_array()[index])
    }

    /// (name, value) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.to_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_order_matches_feature_names() {
        let mut values = [0.0; FEATURE_COUNT];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as f64;
        }
        let vector = FeatureVector::from_array(values);

        // Struct serialization writes fields in declaration order
        let json = serde_json::to_string(&vector).unwrap();
        let mut last = 0;
        for name in FEATURE_NAMES {
            let position = json
                .find(&format!("\"{}\":", name))
                .unwrap_or_else(|| panic!("missing {}", name));
            assert!(position >= last, "{} out of order", name);
            last = position;
        }

        let value = serde_json::to_value(vector).unwrap();
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            assert_eq!(value[*name].as_f64(), Some(i as f64), "feature {}", name);
        }
    }

    #[test]
    fn test_array_round_trip_keeps_positions() {
        let vector = FeatureVector {
            ip: 1.0,
            statistical_report: 2.0,
            phish_hints: 3.0,
            ..Default::default()
        };

        let array = vector.to_array();
        assert_eq!(array[0], 1.0);
        assert_eq!(array[5], 2.0);
        assert_eq!(array[20], 3.0);
        assert_eq!(FeatureVector::from_array(array), vector);
    }

    #[test]
    fn test_get_by_name() {
        let vector = FeatureVector {
            nb_hyphens: 4.0,
            ..Default::default()
        };

        assert_eq!(vector.get("nb_hyphens"), Some(4.0));
        assert_eq!(vector.get("nb_dots"), Some(0.0));
        assert_eq!(vector.get("unknown"), None);
    }

    #[test]
    fn test_structural_group() {
        assert!(is_structural("ip"));
        assert!(is_structural("statistical_report"));
        assert!(!is_structural("length_url"));
        assert!(!is_structural("phish_hints"));
    }
}
