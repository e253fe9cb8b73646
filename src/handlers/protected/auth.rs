use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /me - the caller as resolved from their credential
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(user))
}
