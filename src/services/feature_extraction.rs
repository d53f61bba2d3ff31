// Lexical feature extraction for a single URL
// Values must match what the URL risk model saw during training, including the
// quirks of the training pipeline (raw-URL regexes, path reconstruction from the suffix).

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::features::FeatureVector;
use crate::services::domain_parts::{DomainParser, DomainParts};
use crate::services::reputation::{self, ReputationResolver};

// =============================================================================
// STATIC PATTERNS AND VOCABULARIES
// =============================================================================

lazy_static! {
    /// IPv4 (decimal or hex) followed by a path separator, IPv6, or a 7-hex-digit run
    static ref IP_PATTERN: Regex = Regex::new(
        r"(([01]?\d\d?|2[0-4]\d|25[0-5])\.){3}([01]?\d\d?|2[0-4]\d|25[0-5])/|(0x[0-9a-fA-F]{1,2}\.){3}0x[0-9a-fA-F]{1,2}/|(?:[a-fA-F0-9]{1,4}:){7}[a-fA-F0-9]{1,4}|[0-9a-fA-F]{7}"
    )
    .expect("Invalid IP pattern regex");

    /// Known link shorteners, matched anywhere in the raw URL
    static ref SHORTENER_PATTERN: Regex = Regex::new(concat!(
        r"bit\.ly|goo\.gl|shorte\.st|go2l\.ink|x\.co|ow\.ly|t\.co|tinyurl|",
        r"tr\.im|is\.gd|cli\.gs|yfrog\.com|migre\.me|ff\.im|tiny\.cc|url4\.eu|",
        r"twit\.ac|su\.pr|twurl\.nl|snipurl\.com|short\.to|BudURL\.com|ping\.fm|",
        r"post\.ly|Just\.as|bkite\.com|snipr\.com|fic\.kr|loopt\.us|doiop\.com|",
        r"short\.ie|kl\.am|wp\.me|rubyurl\.com|om\.ly|to\.ly|bit\.do|lnkd\.in|",
        r"db\.tt|qr\.ae|adf\.ly|bitly\.com|cur\.lv|tinyurl\.com|ity\.im|q\.gs|",
        r"po\.st|bc\.vc|twitthis\.com|u\.to|j\.mp|buzurl\.com|cutt\.us|u\.bb|",
        r"yourls\.org|prettylinkpro\.com|scrnch\.me|filoops\.info|vzturl\.com|",
        r"qr\.net|1url\.com|tweez\.me|v\.gd|link\.zip\.net"
    ))
    .expect("Invalid shortener regex");

    /// Public suffixes commonly abused for phishing
    static ref SUSPICIOUS_TLDS: HashSet<&'static str> = [
        "fit", "tk", "gp", "ga", "work", "ml", "date", "wang", "men", "icu",
        "online", "click", "country", "stream", "download", "xin", "racing",
        "jetzt", "ren", "mom", "party", "review", "trade", "accountants",
        "science", "ninja", "xyz", "faith", "zip", "cricket", "win",
        "accountant", "realtor", "top", "christmas", "gdn", "link", "asia",
        "club", "la", "ae", "exposed", "pe", "audio", "website", "bj", "mx",
        "media",
    ]
    .into_iter()
    .collect();
}

/// Keywords counted by `phish_hints`
const PHISH_HINTS: [&str; 16] = [
    "wp", "login", "includes", "admin", "content", "site", "images", "js", "alibaba", "css",
    "myaccount", "dropbox", "themes", "plugins", "signin", "view",
];

const TOKEN_DELIMITERS: [char; 10] = ['-', '.', '/', '?', '=', '@', '&', '%', ':', '_'];

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),
}

// =============================================================================
// TOKEN SCOPES
// =============================================================================

/// Token scopes used by the word-level features
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlTokens {
    pub domain: Vec<String>,
    pub subdomain: Vec<String>,
    pub path: Vec<String>,
}

impl UrlTokens {
    pub fn new(parts: &DomainParts, path: &str) -> Self {
        Self {
            domain: tokenize(&parts.domain),
            subdomain: tokenize(&parts.subdomain),
            path: tokenize(path),
        }
    }

    /// domain + path + subdomain
    pub fn url(&self) -> Vec<&str> {
        self.domain
            .iter()
            .chain(&self.path)
            .chain(&self.subdomain)
            .map(String::as_str)
            .collect()
    }

    /// domain + subdomain
    pub fn host(&self) -> Vec<&str> {
        self.domain
            .iter()
            .chain(&self.subdomain)
            .map(String::as_str)
            .collect()
    }

    pub fn path(&self) -> Vec<&str> {
        self.path.iter().map(String::as_str).collect()
    }
}

pub fn tokenize(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| TOKEN_DELIMITERS.contains(&c))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// FEATURE EXTRACTOR
// =============================================================================

pub struct FeatureExtractor {
    domains: Arc<DomainParser>,
    resolver: Arc<dyn ReputationResolver>,
}

impl FeatureExtractor {
    pub fn new(domains: Arc<DomainParser>, resolver: Arc<dyn ReputationResolver>) -> Self {
        Self { domains, resolver }
    }

    /// Compute the 21-feature vector for `url`. The reputation lookup is the only I/O.
    pub async fn extract(&self, url: &str) -> Result<FeatureVector, FeatureError> {
        let (scheme, hostname) = scheme_and_host(url)?;

        let parts = self.domains.split(&hostname);
        let path = reconstruct_path(url, &parts.suffix);
        let tokens = UrlTokens::new(&parts, path);
        let url_tokens = tokens.url();

        let statistical_report =
            reputation::statistical_report(self.resolver.as_ref(), url, &parts.registrable()).await;

        let features = FeatureVector {
            ip: flag(IP_PATTERN.is_match(url)),
            https_token: flag(scheme != "https"),
            prefix_suffix: flag(authority(url).contains('-')),
            shortening_service: flag(SHORTENER_PATTERN.is_match(url)),
            suspicious_tld: flag(SUSPICIOUS_TLDS.contains(parts.suffix.as_str())),
            statistical_report,
            length_url: url.chars().count() as f64,
            length_hostname: hostname.chars().count() as f64,
            nb_dots: count_char(url, '.'),
            nb_hyphens: count_char(url, '-'),
            nb_qm: count_char(url, '?'),
            nb_percent: count_char(url, '%'),
            nb_slash: count_char(url, '/'),
            nb_www: url_tokens.iter().filter(|t| t.contains("www")).count() as f64,
            ratio_digits_url: ratio_digits(url),
            ratio_digits_host: ratio_digits(&hostname),
            char_repeat: char_repeat(&url_tokens) as f64,
            avg_words_raw: average_length(&url_tokens),
            avg_word_host: average_length(&tokens.host()),
            avg_word_path: average_length(&tokens.path()),
            phish_hints: phish_hints(url) as f64,
        };

        debug!(
            "Extracted features for {} (domain={}, suffix={}, report={})",
            url,
            parts.domain,
            parts.suffix,
            statistical_report
        );

        Ok(features)
    }
}

// =============================================================================
// FEATURE HELPERS
// =============================================================================

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

/// Scheme and hostname read from the raw URL text. Userinfo and port are dropped,
/// IPv6 brackets unwrapped and the host lower-cased, but it is otherwise left as
/// written: hex or out-of-range IPv4 and non-ASCII labels keep their original form.
pub fn scheme_and_host(url: &str) -> Result<(String, String), FeatureError> {
    let (raw_scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| FeatureError::MalformedUrl("URL has no scheme".to_string()))?;

    let valid_scheme = raw_scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && raw_scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid_scheme {
        return Err(FeatureError::MalformedUrl(format!("Invalid scheme: {}", raw_scheme)));
    }

    // Url normalizes hosts, so only its scheme is used
    let scheme = match Url::parse(url) {
        Ok(parsed) => parsed.scheme().to_string(),
        Err(_) => raw_scheme.to_ascii_lowercase(),
    };

    let netloc = rest
        .split(|c: char| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or(rest);
    if netloc.contains('[') != netloc.contains(']') {
        return Err(FeatureError::MalformedUrl("Invalid IPv6 host".to_string()));
    }

    let host_info = netloc.rsplit_once('@').map(|(_, host)| host).unwrap_or(netloc);
    let hostname = match host_info.split_once('[') {
        Some((_, bracketed)) => bracketed.split(']').next().unwrap_or(bracketed),
        None => host_info.split(':').next().unwrap_or(host_info),
    }
    .to_lowercase();

    if hostname.is_empty() {
        return Err(FeatureError::MalformedUrl("URL has no host".to_string()));
    }

    Ok((scheme, hostname))
}

/// Text between `scheme://` and the first following `/`
fn authority(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    rest.split('/').next().unwrap_or(rest)
}

/// Path as the training pipeline derived it: everything after the first `/`
/// that follows the first occurrence of the public suffix in the raw URL.
pub fn reconstruct_path<'a>(url: &'a str, suffix: &str) -> &'a str {
    url.find(suffix)
        .map(|pos| &url[pos..])
        .and_then(|tail| tail.split_once('/'))
        .map(|(_, path)| path)
        .unwrap_or("")
}

fn count_char(s: &str, needle: char) -> f64 {
    s.chars().filter(|&c| c == needle).count() as f64
}

fn ratio_digits(s: &str) -> f64 {
    let total = s.chars().count();
    if total == 0 {
        return 0.0;
    }
    s.chars().filter(char::is_ascii_digit).count() as f64 / total as f64
}

/// Windows of 2..=5 identical consecutive characters, summed over every window length
pub fn char_repeat(tokens: &[&str]) -> usize {
    tokens
        .iter()
        .map(|token| {
            let chars: Vec<char> = token.chars().collect();
            (2..=5)
                .map(|n| {
                    chars
                        .windows(n)
                        .filter(|w| w.iter().all(|&c| c == w[0]))
                        .count()
                })
                .sum::<usize>()
        })
        .sum()
}

fn average_length(tokens: &[&str]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let total: usize = tokens.iter().map(|t| t.chars().count()).sum();
    total as f64 / tokens.len() as f64
}

/// Overlapping keyword occurrences in the lower-cased URL.
/// Only "alibaba" can overlap itself: `alibabalibaba` counts 2.
pub fn phish_hints(url: &str) -> usize {
    let lowered = url.to_lowercase();
    PHISH_HINTS
        .iter()
        .map(|hint| {
            lowered
                .char_indices()
                .filter(|(i, _)| lowered[*i..].starts_with(hint))
                .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::features::report;
    use crate::services::reputation::DisabledResolver;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(
            Arc::new(DomainParser::embedded().unwrap()),
            Arc::new(DisabledResolver),
        )
    }

    #[test]
    fn test_tokenize_drops_empty_tokens() {
        assert_eq!(
            tokenize("/Secure--Login/index.php?id=7"),
            vec!["secure", "login", "index", "php", "id", "7"]
        );
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_char_repeat_windows() {
        assert_eq!(char_repeat(&["ab"]), 0);
        assert_eq!(char_repeat(&["aa"]), 1);
        assert_eq!(char_repeat(&["aaa"]), 3);
        assert_eq!(char_repeat(&["aaaa"]), 6);
        assert_eq!(char_repeat(&["aaaaa"]), 10);
        assert_eq!(char_repeat(&["aa", "bbb"]), 4);
    }

    #[test]
    fn test_phish_hints_overlapping() {
        assert_eq!(phish_hints("http://example.com/WP-Login"), 2);
        assert_eq!(phish_hints("http://example.com/"), 0);
        assert_eq!(phish_hints("http://a.com/signin/js/js"), 3);
    }

    #[test]
    fn test_phish_hints_self_overlap() {
        assert_eq!(phish_hints("http://alibabalibaba.com/"), 2);
        assert_eq!(phish_hints("http://alibaba.com/"), 1);
    }

    #[test]
    fn test_scheme_and_host_strips_userinfo_and_port() {
        assert_eq!(
            scheme_and_host("HTTP://User:Pw@Example.COM:8080/a").unwrap(),
            ("http".to_string(), "example.com".to_string())
        );
        assert_eq!(
            scheme_and_host("https://[2001:DB8::1]:443/").unwrap(),
            ("https".to_string(), "2001:db8::1".to_string())
        );
        assert_eq!(
            scheme_and_host("http://example.com?q=1").unwrap().1,
            "example.com"
        );
    }

    #[test]
    fn test_scheme_and_host_keeps_written_form() {
        assert_eq!(scheme_and_host("http://999.999.999.999/login").unwrap().1, "999.999.999.999");
        assert_eq!(scheme_and_host("http://example.com:99999/login").unwrap().1, "example.com");
        assert_eq!(scheme_and_host("http://exa mple.com/").unwrap().1, "exa mple.com");
        assert_eq!(scheme_and_host("http://0x7f.0x0.0x0.0x1/login").unwrap().1, "0x7f.0x0.0x0.0x1");
        assert_eq!(scheme_and_host("http://пример.рф/вход").unwrap().1, "пример.рф");
    }

    #[test]
    fn test_scheme_and_host_rejects_unsplittable() {
        assert!(scheme_and_host("not a url").is_err());
        assert!(scheme_and_host("http://").is_err());
        assert!(scheme_and_host("http:///path").is_err());
        assert!(scheme_and_host("http://user@:80/").is_err());
        assert!(scheme_and_host("http://[::1/").is_err());
        assert!(scheme_and_host("1http://example.com").is_err());
    }

    #[test]
    fn test_reconstruct_path() {
        assert_eq!(reconstruct_path("http://a.example.com/x/y?q=1", "com"), "x/y?q=1");
        assert_eq!(reconstruct_path("http://example.com", "com"), "");
        // empty suffix matches at position 0
        assert_eq!(reconstruct_path("http://host/path", ""), "/host/path");
    }

    #[test]
    fn test_authority() {
        assert_eq!(authority("http://my-site.com/a-b"), "my-site.com");
        assert_eq!(authority("https://example.com"), "example.com");
    }

    #[tokio::test]
    async fn test_malformed_url_rejected() {
        let result = extractor().extract("not a url").await;
        assert!(matches!(result, Err(FeatureError::MalformedUrl(_))));
    }

    #[tokio::test]
    async fn test_prefix_suffix_only_looks_at_authority() {
        let features = extractor().extract("http://example.com/a-b").await.unwrap();
        assert_eq!(features.prefix_suffix, 0.0);
        assert_eq!(features.nb_hyphens, 1.0);

        let features = extractor().extract("http://my-site.com/").await.unwrap();
        assert_eq!(features.prefix_suffix, 1.0);
    }

    #[tokio::test]
    async fn test_counts_and_ratios() {
        let features = extractor().extract("http://www.example.com/a1?b=2%20").await.unwrap();
        assert_eq!(features.length_url, 32.0);
        assert_eq!(features.length_hostname, 15.0);
        assert_eq!(features.nb_dots, 2.0);
        assert_eq!(features.nb_qm, 1.0);
        assert_eq!(features.nb_percent, 1.0);
        assert_eq!(features.nb_slash, 3.0);
        assert_eq!(features.nb_www, 1.0);
        assert_eq!(features.ratio_digits_host, 0.0);
        assert!((features.ratio_digits_url - 4.0 / 32.0).abs() < 1e-12);
        assert_eq!(features.statistical_report, report::UNRESOLVED);
    }

    #[tokio::test]
    async fn test_word_averages() {
        // domain [example], path [abc, de], subdomain [www]
        let features = extractor().extract("https://www.example.com/abc/de").await.unwrap();
        assert!((features.avg_words_raw - 15.0 / 4.0).abs() < 1e-12);
        assert!((features.avg_word_host - 5.0).abs() < 1e-12);
        assert!((features.avg_word_path - 2.5).abs() < 1e-12);
    }
}
