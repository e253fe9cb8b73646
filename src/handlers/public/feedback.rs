use axum::extract::State;
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::models::FeedbackRequest;
use crate::platform::Table;
use crate::state::AppState;

/// POST /feedback - append one anonymous feedback row
///
/// Returns the inserted rows as echoed by the platform.
pub async fn create(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<FeedbackRequest>,
) -> ApiResult<Vec<Value>> {
    let rows = state
        .platform
        .insert(Table::Feedbacks, payload.to_row())
        .await?;

    tracing::info!("Feedback recorded from {}", payload.user_email);
    Ok(ApiResponse::success(rows))
}
