// GET handlers: version, health, status, language sniff, artifact

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /health — liveness check.
pub(super) async fn health_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/status — account count, whether an artifact exists, cycles so far.
pub(super) async fn api_status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let data_exists = tokio::fs::try_exists(state.output_path.as_ref())
        .await
        .unwrap_or(false);
    axum::Json(serde_json::json!({
        "status": "running",
        "dataExists": data_exists,
        "accounts": state.account_count,
        "cyclesCompleted": state
            .cycles_completed
            .load(std::sync::atomic::Ordering::Relaxed),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/language — frontend locale from the Accept-Language header.
pub(super) async fn api_language_handler(headers: HeaderMap) -> impl IntoResponse {
    let accept = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let language = if accept.contains("zh") { "zh" } else { "en" };
    axum::Json(serde_json::json!({ "language": language }))
}

/// GET /data/analytics.json — the published snapshot, never cached by
/// intermediaries or the browser.
pub(super) async fn artifact_handler(State(state): State<AppState>) -> axum::response::Response {
    match tokio::fs::read(state.output_path.as_ref()).await {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
                (header::PRAGMA, "no-cache"),
                (header::EXPIRES, "0"),
            ],
            body,
        )
            .into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            axum::Json(serde_json::json!({ "error": "no snapshot published yet" })),
        )
            .into_response(),
    }
}
