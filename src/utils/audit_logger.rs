// Audit logging for scan and history operations
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::scan::{Label, ScanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    UrlScanned,
    UrlClassified,
    HistoryCleared,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub action: AuditAction,
    pub resource_id: Option<String>,
    pub resource_type: String,
    pub url: Option<String>,
    pub label: Option<Label>,
    pub final_score: Option<f64>,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub struct AuditLogger;

impl AuditLogger {
    /// Log a completed scan
    pub fn log_scan(result: &ScanResult) {
        Self::emit(AuditLog {
            id: Uuid::new_v4(),
            action: AuditAction::UrlScanned,
            resource_id: Some(result.id.to_string()),
            resource_type: "scan".to_string(),
            url: Some(result.url.clone()),
            label: Some(result.label),
            final_score: Some(result.final_score),
            details: Some(format!(
                "risk_level={:?} advisories={} nlp_model_used={}",
                result.risk_level, result.triggered_count, result.nlp_model_used
            )),
            timestamp: Utc::now(),
        });
    }

    /// Log a feature breakdown request
    pub fn log_classification(url: &str, probability: f64) {
        Self::emit(AuditLog {
            id: Uuid::new_v4(),
            action: AuditAction::UrlClassified,
            resource_id: None,
            resource_type: "classification".to_string(),
            url: Some(url.to_string()),
            label: None,
            final_score: Some(probability),
            details: None,
            timestamp: Utc::now(),
        });
    }

    pub fn log_history_cleared(removed: usize) {
        Self::emit(AuditLog {
            id: Uuid::new_v4(),
            action: AuditAction::HistoryCleared,
            resource_id: Some(format!("{} scans", removed)),
            resource_type: "scan_history".to_string(),
            url: None,
            label: None,
            final_score: None,
            details: None,
            timestamp: Utc::now(),
        });
    }

    fn emit(audit_log: AuditLog) {
        let json_log = serde_json::to_string(&audit_log).unwrap_or_else(|e| {
            warn!("Failed to serialize audit log: {}", e);
            format!("{:?}", audit_log)
        });

        info!(target: "audit", "{}", json_log);
    }
}
