// Scan history persistence tests

mod common;

use common::{sample_result, scan_service, ConstantOracle, PHISHY_URL};
use phishscan_backend_core::models::scan::ScanRequest;
use phishscan_backend_core::services::ScanHistoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

fn temp_history_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("phishscan-test-{}", Uuid::new_v4()))
        .join("scan_history.json")
}

fn cleanup(path: &PathBuf) {
    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[tokio::test]
async fn test_history_survives_reload() {
    let path = temp_history_path();

    let store = ScanHistoryStore::load(path.clone(), 10);
    store.record(sample_result("https://a.example")).await;
    store.record(sample_result("https://b.example")).await;
    store.record(sample_result("https://c.example")).await;
    assert!(path.exists());

    // smaller cap on reload keeps the newest entries
    let reloaded = ScanHistoryStore::load(path.clone(), 2);
    let urls: Vec<String> = reloaded.list().await.into_iter().map(|r| r.url).collect();
    assert_eq!(urls, vec!["https://c.example", "https://b.example"]);

    cleanup(&path);
}

#[tokio::test]
async fn test_corrupt_file_starts_empty() {
    let path = temp_history_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    let store = ScanHistoryStore::load(path.clone(), 10);
    assert!(store.is_empty().await);

    store.record(sample_result("https://a.example")).await;
    let reloaded = ScanHistoryStore::load(path.clone(), 10);
    assert_eq!(reloaded.len().await, 1);

    cleanup(&path);
}

#[tokio::test]
async fn test_clear_is_persisted() {
    let path = temp_history_path();

    let store = ScanHistoryStore::load(path.clone(), 10);
    store.record(sample_result("https://a.example")).await;
    assert_eq!(store.clear().await, 1);

    let reloaded = ScanHistoryStore::load(path.clone(), 10);
    assert!(reloaded.is_empty().await);

    cleanup(&path);
}

#[tokio::test]
async fn test_concurrent_scans_respect_cap() {
    let history = Arc::new(ScanHistoryStore::in_memory(5));
    let service = Arc::new(scan_service(
        Some(Arc::new(ConstantOracle(0.5))),
        history.clone(),
    ));

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let url = format!("{}?n={}", PHISHY_URL, i);
            service.scan(ScanRequest::for_url(url)).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(history.len().await, 5);
}

#[tokio::test]
async fn test_failed_scan_is_not_recorded() {
    let history = Arc::new(ScanHistoryStore::in_memory(5));
    let service = scan_service(Some(Arc::new(ConstantOracle(0.5))), history.clone());

    assert!(service.scan(ScanRequest::for_url("ftp://example.com")).await.is_err());
    assert!(history.is_empty().await);
}
