// Advisory types attached to triggered URL features

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Advisory severity. Ordering is semantic: Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

/// Highest severity across a set of advisories, `None` when nothing triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum HighestSeverity {
    None,
    Low,
    Medium,
    High,
}

impl From<Severity> for HighestSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => HighestSeverity::Low,
            Severity::Medium => HighestSeverity::Medium,
            Severity::High => HighestSeverity::High,
        }
    }
}

/// Explanation emitted once per triggered feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Advisory {
    pub feature: String,
    pub explanation: String,
    pub risk: String,
    pub possible_attacks: Vec<String>,
    pub severity: Severity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(HighestSeverity::None < HighestSeverity::Low);
        assert_eq!(HighestSeverity::from(Severity::High), HighestSeverity::High);
    }

    #[test]
    fn test_severity_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Severity::Medium).unwrap(), "\"Medium\"");
        assert_eq!(serde_json::to_string(&HighestSeverity::None).unwrap(), "\"None\"");
    }
}
