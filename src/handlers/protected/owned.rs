//! Shared select/insert/update for tables scoped by `user_id`.

use serde_json::Value;

use crate::error::ApiError;
use crate::filter::Filter;
use crate::middleware::AuthUser;
use crate::models::OWNER_COLUMN;
use crate::platform::Table;
use crate::state::AppState;

pub(super) async fn list(state: &AppState, table: Table, user: &AuthUser) -> Result<Vec<Value>, ApiError> {
    let filter = Filter::new().eq(OWNER_COLUMN, &user.id)?;
    Ok(state.platform.select(table, &filter).await?)
}

/// `row` must already carry the caller's id in the owner column
pub(super) async fn create(state: &AppState, table: Table, user: &AuthUser, row: Value) -> Result<Vec<Value>, ApiError> {
    let rows = state.platform.insert(table, row).await?;
    tracing::info!("{} created {} row(s) in {}", user.id, rows.len(), table);
    Ok(rows)
}

/// Update the row with `id` only if the caller owns it.
///
/// A missing row and a row owned by someone else both answer 404.
pub(super) async fn update(
    state: &AppState,
    table: Table,
    user: &AuthUser,
    id: i64,
    patch: Value,
) -> Result<Vec<Value>, ApiError> {
    let filter = Filter::new().eq("id", id)?.eq(OWNER_COLUMN, &user.id)?;
    let rows = state.platform.update(table, &filter, patch).await?;

    if rows.is_empty() {
        tracing::warn!("{} tried to update {} {} which it does not own or does not exist", user.id, table, id);
        return Err(ApiError::not_found(format!("No {} row with id {}", table, id)));
    }
    Ok(rows)
}
