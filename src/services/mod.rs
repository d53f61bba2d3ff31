// Services module for the PhishScan backend
// Scan pipeline components and their pluggable capabilities

pub mod attack_knowledge;
pub mod content_analysis;
pub mod domain_parts;
pub mod feature_extraction;
pub mod hybrid_fusion;
pub mod oracle;
pub mod reputation;
pub mod scan;
pub mod scan_history;
pub mod structural_analysis;

// Re-export commonly used services
pub use content_analysis::{ClassifierError, ContentAnalyzer, HttpTextClassifier, TextClassifier};
pub use domain_parts::{DomainParser, DomainParserError, DomainParts};
pub use feature_extraction::{FeatureError, FeatureExtractor};
pub use hybrid_fusion::{FusionError, FusionOutcome};
pub use oracle::{ForestOracle, OracleError, UrlRiskOracle};
pub use reputation::{DisabledResolver, DnsReputationResolver, ReputationResolver};
pub use scan::ScanService;
pub use scan_history::{HistoryError, ScanHistoryStore};
