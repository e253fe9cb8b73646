use axum::{extract::State, Extension};
use serde_json::Value;

use super::owned;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson, ValidPath};
use crate::models::VisitRequest;
use crate::platform::Table;
use crate::state::AppState;

/// GET /visits - the caller's visits
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Value>> {
    let rows = owned::list(&state, Table::Visits, &user).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /visits - record a visit owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(payload): ValidJson<VisitRequest>,
) -> ApiResult<Vec<Value>> {
    let rows = owned::create(&state, Table::Visits, &user, payload.to_row(&user.id)).await?;
    Ok(ApiResponse::created(rows))
}

/// PUT /visits/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<VisitRequest>,
) -> ApiResult<Vec<Value>> {
    let rows = owned::update(&state, Table::Visits, &user, id, payload.to_patch()).await?;
    Ok(ApiResponse::success(rows))
}
