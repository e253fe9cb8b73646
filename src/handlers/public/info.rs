use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - liveness payload
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Hello from SalesDesk API!",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /semiconductor-info
pub async fn semiconductor_info() -> Json<Value> {
    Json(json!({
        "text": "Semiconductors are the foundation of modern electronics and computing. testing it"
    }))
}

/// GET /health - pings the data platform
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.platform.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "platform": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "platform_error": e.to_string()
                })),
            )
        }
    }
}
