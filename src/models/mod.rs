pub mod advisory;
pub mod features;
pub mod scan;

// Re-export common types
pub use advisory::{Advisory, HighestSeverity, Severity};
pub use features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use scan::{
    ClassifyRequest, ClassifyResponse, ClearHistoryResponse, FeatureBreakdown, Label,
    PageSnapshot, RiskLevel, ScanRequest, ScanResult,
};
