// Centralized configuration management for the PhishScan backend
// Load ALL env vars ONCE at startup

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    // For tests, load .env file first
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,
    pub rust_log: String,

    // Nested configs
    pub model: ModelConfig,
    pub nlp: NlpConfig,
    pub history: HistoryConfig,
    pub security: SecurityConfig,
    pub features: FeatureConfig,
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// URL model and feature extraction inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub url_model_path: String,
    pub public_suffix_list_path: Option<String>,
    pub enable_dns_reputation: bool,
    pub dns_lookup_timeout_ms: u64,
}

impl ModelConfig {
    pub fn dns_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.dns_lookup_timeout_ms)
    }
}

/// Optional hosted text classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpConfig {
    /// Inference endpoint; `{model}` is replaced with `model`. Unset means keyword-only.
    pub classifier_url: Option<String>,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub timeout_ms: u64,
}

impl NlpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Persisted scan log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub path: String,
    pub capacity: usize,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_allowed_origins: Vec<String>,
}

/// Feature flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub enable_api_docs: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Helper function to get optional env var with default
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        // Unset and blank are both treated as absent
        let get_optional = |key: &str| -> Option<String> {
            env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let parse_bool_or_default = |key: &str, default: &str| -> bool {
            get_or_default(key, default).to_lowercase() == "true"
        };

        // Parse bind address to extract port
        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:5001");
        let port = bind_address
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5001);

        let environment = Environment::from(get_or_default("ENVIRONMENT", "development"));
        let rust_log = get_or_default("RUST_LOG", "info");

        let model = ModelConfig {
            url_model_path: get_or_default("URL_MODEL_PATH", "models/url_model.json"),
            public_suffix_list_path: get_optional("PUBLIC_SUFFIX_LIST_PATH"),
            enable_dns_reputation: parse_bool_or_default("ENABLE_DNS_REPUTATION", "true"),
            dns_lookup_timeout_ms: parse_u64_or_default("DNS_LOOKUP_TIMEOUT_MS", "2000")?,
        };

        let nlp = NlpConfig {
            classifier_url: get_optional("NLP_CLASSIFIER_URL"),
            model: get_or_default(
                "PHISHING_NLP_MODEL",
                "cybersectony/phishing-email-detection-distilbert_v2.4.3",
            ),
            api_token: get_optional("NLP_API_TOKEN"),
            timeout_ms: parse_u64_or_default("NLP_TIMEOUT_MS", "3000")?,
        };

        let capacity = parse_u64_or_default("SCAN_HISTORY_CAPACITY", "500")?;
        if capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "SCAN_HISTORY_CAPACITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let history = HistoryConfig {
            path: get_or_default("SCAN_HISTORY_PATH", "data/scan_history.json"),
            capacity: capacity as usize,
        };

        let cors_allowed_origins = get_or_default("CORS_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(AppConfig {
            bind_address,
            port,
            environment,
            rust_log,
            model,
            nlp,
            history,
            security: SecurityConfig {
                cors_allowed_origins,
            },
            features: FeatureConfig {
                enable_api_docs: parse_bool_or_default("ENABLE_API_DOCS", "true"),
            },
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Check if running in test environment
    pub fn is_test(&self) -> bool {
        self.environment == Environment::Test
    }
}

/// Get the global configuration instance
/// This is the primary way to access configuration throughout the app
pub fn config() -> &'static AppConfig {
    &CONFIG
}
