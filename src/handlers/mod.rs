// HTTP handlers for the scan API

pub mod docs;
pub mod history;
pub mod scan;

use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};

// Scan routes
pub fn scan_routes() -> Router<AppState> {
    Router::new()
        .route("/scan", post(scan::scan_url))
        .route("/classify", post(scan::classify_url))
}

// History routes
pub fn history_routes() -> Router<AppState> {
    Router::new().route(
        "/history",
        get(history::get_history).delete(history::clear_history),
    )
}

// API documentation routes
pub fn docs_routes() -> Router<AppState> {
    Router::new().route("/docs/openapi.json", get(docs::serve_openapi_spec))
}
