// Utility modules for the PhishScan backend

pub mod audit_logger;
pub mod scan_errors;

pub use audit_logger::{AuditAction, AuditLog, AuditLogger};
pub use scan_errors::{ScanApiResult, ScanError, ScanErrorResponse, ScanStage};
