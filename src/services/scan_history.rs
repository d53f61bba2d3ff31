// Capped scan log, newest first
// The in-memory list is authoritative; the JSON file is best-effort persistence.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::models::scan::ScanResult;

pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to serialize scan history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write scan history to {path}: {message}")]
    Write { path: String, message: String },
}

pub struct ScanHistoryStore {
    entries: RwLock<Vec<ScanResult>>,
    capacity: usize,
    path: Option<PathBuf>,
}

impl ScanHistoryStore {
    /// Store without a backing file
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            capacity: capacity.max(1),
            path: None,
        }
    }

    /// Load previously persisted history. A missing or unreadable file starts empty.
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let capacity = capacity.max(1);

        let mut entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<ScanResult>>(&content) {
                Ok(entries) => {
                    info!("Loaded {} scans from {}", entries.len(), path.display());
                    entries
                },
                Err(e) => {
                    warn!(
                        "Scan history at {} is corrupt ({}). Starting with empty history.",
                        path.display(),
                        e
                    );
                    Vec::new()
                },
            },
            Err(e) => {
                debug!("No scan history at {}: {}", path.display(), e);
                Vec::new()
            },
        };
        entries.truncate(capacity);

        Self {
            entries: RwLock::new(entries),
            capacity,
            path: Some(path),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert at the front and trim to capacity in one critical section
    pub async fn record(&self, result: ScanResult) {
        let mut entries = self.entries.write().await;
        entries.insert(0, result);
        entries.truncate(self.capacity);
        self.persist(&entries).await;
    }

    /// Snapshot, newest first
    pub async fn list(&self) -> Vec<ScanResult> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Remove everything, returning how many entries were dropped
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        self.persist(&entries).await;
        removed
    }

    async fn persist(&self, entries: &[ScanResult]) {
        let Some(path) = &self.path else {
            return;
        };

        if let Err(e) = write_history(path, entries).await {
            warn!("{}. Keeping in-memory history only.", e);
        }
    }
}

async fn write_history(path: &Path, entries: &[ScanResult]) -> Result<(), HistoryError> {
    let json = serde_json::to_vec_pretty(entries)?;
    let write_error = |e: std::io::Error| HistoryError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    tokio::fs::write(path, json).await.map_err(write_error)?;
    Ok(())
}
