// Hostname decomposition into subdomain / registrable label / public suffix
// Longest-match public suffix rules; only ICANN rules are considered.

use publicsuffix::{List, Psl};
use std::net::IpAddr;
use thiserror::Error;
use tracing::{info, warn};

/// Snapshot compiled into the binary, used when no list file is configured
const EMBEDDED_LIST: &str = include_str!("../../data/public_suffix_list.dat");

#[derive(Error, Debug)]
pub enum DomainParserError {
    #[error("Failed to read public suffix list {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse public suffix list: {0}")]
    Parse(String),
}

/// A hostname split the way the URL model's training pipeline split it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomain: String,
    pub domain: String,
    pub suffix: String,
}

impl DomainParts {
    /// `domain.suffix`, or just the domain label when the suffix is unknown
    pub fn registrable(&self) -> String {
        if self.suffix.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.domain, self.suffix)
        }
    }
}

pub struct DomainParser {
    list: List,
}

impl DomainParser {
    /// Parser backed by the embedded snapshot
    pub fn embedded() -> Result<Self, DomainParserError> {
        Self::from_list_text(EMBEDDED_LIST)
    }

    pub fn from_list_text(text: &str) -> Result<Self, DomainParserError> {
        let list = text
            .parse::<List>()
            .map_err(|e| DomainParserError::Parse(e.to_string()))?;
        Ok(Self { list })
    }

    pub fn from_file(path: &str) -> Result<Self, DomainParserError> {
        let text = std::fs::read_to_string(path).map_err(|e| DomainParserError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_list_text(&text)
    }

    /// Load the configured list, falling back to the embedded snapshot
    pub fn load(path: Option<&str>) -> Result<Self, DomainParserError> {
        if let Some(path) = path {
            match Self::from_file(path) {
                Ok(parser) => {
                    info!("Loaded public suffix list from {}", path);
                    return Ok(parser);
                },
                Err(e) => {
                    warn!("{}. Using embedded public suffix snapshot.", e);
                },
            }
        }

        Self::embedded()
    }

    /// Split a hostname. IP literals are returned whole as the domain; hosts
    /// whose TLD is not in the list get an empty suffix.
    pub fn split(&self, host: &str) -> DomainParts {
        let host = host
            .trim_end_matches('.')
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_lowercase();

        if host.is_empty() {
            return DomainParts::default();
        }

        if host.parse::<IpAddr>().is_ok() {
            return DomainParts {
                domain: host,
                ..Default::default()
            };
        }

        let suffix = self
            .list
            .suffix(host.as_bytes())
            .filter(|s| s.is_known())
            .and_then(|s| std::str::from_utf8(s.as_bytes()).ok().map(str::to_string))
            .unwrap_or_default();

        let rest = if suffix.is_empty() {
            host.as_str()
        } else if host == suffix {
            ""
        } else {
            host.strip_suffix(suffix.as_str())
                .and_then(|r| r.strip_suffix('.'))
                .unwrap_or(host.as_str())
        };

        let (subdomain, domain) = match rest.rsplit_once('.') {
            Some((sub, label)) => (sub.to_string(), label.to_string()),
            None => (String::new(), rest.to_string()),
        };

        DomainParts {
            subdomain,
            domain,
            suffix,
        }
    }
}
