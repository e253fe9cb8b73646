use axum::{extract::State, Extension};
use serde_json::Value;

use super::owned;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson, ValidPath};
use crate::models::OpportunityRequest;
use crate::platform::Table;
use crate::state::AppState;

/// GET /opportunities
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Value>> {
    let rows = owned::list(&state, Table::Opportunities, &user).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /opportunity - open an opportunity owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(payload): ValidJson<OpportunityRequest>,
) -> ApiResult<Vec<Value>> {
    let rows = owned::create(&state, Table::Opportunities, &user, payload.to_row(&user.id)).await?;
    Ok(ApiResponse::created(rows))
}

/// PUT /opportunity/:id - move an opportunity through the pipeline
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<OpportunityRequest>,
) -> ApiResult<Vec<Value>> {
    let rows = owned::update(&state, Table::Opportunities, &user, id, payload.to_patch()).await?;
    Ok(ApiResponse::success(rows))
}
