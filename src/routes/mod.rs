// HTTP routes: health/status surface plus the published artifact

mod http;

use axum::{Router, routing::get};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) output_path: Arc<PathBuf>,
    pub(crate) account_count: usize,
    pub(crate) cycles_completed: Arc<AtomicU64>,
}

pub fn app(
    output_path: PathBuf,
    account_count: usize,
    cycles_completed: Arc<AtomicU64>,
) -> Router {
    let state = AppState {
        output_path: Arc::new(output_path),
        account_count,
        cycles_completed,
    };
    Router::new()
        .route("/", get(|| async { "zonewatch: zone analytics collector" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/health", get(http::health_handler)) // GET /health
        .route("/api/status", get(http::api_status_handler)) // GET /api/status
        .route("/api/language", get(http::api_language_handler)) // GET /api/language
        .route("/data/analytics.json", get(http::artifact_handler)) // GET /data/analytics.json
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
