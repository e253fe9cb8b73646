use axum::{extract::State, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::ValidJson;
use crate::models::{CreateUserRequest, LoginRequest};
use crate::services::{ProvisionError, ProvisioningService, SessionService};
use crate::state::AppState;

/// Body returned for every failed login, whatever the cause
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// POST /login - verify credentials and issue a bearer token
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "user": { "id": "...", "email": "...", "name": "...", "role": "..." },
///   "token": "eyJhbGciOiJIUzI1NiI...",
///   "expires_in": 604800
/// }
/// ```
///
/// A mismatch is not an HTTP error: it answers 200 with `success: false`.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let sessions = SessionService::new(&state);

    let Some(user) = sessions
        .authenticate(&payload.email, &payload.password)
        .await?
    else {
        return Ok(Json(json!({
            "success": false,
            "message": INVALID_CREDENTIALS
        })));
    };

    let token = sessions.issue_token(&user)?;

    Ok(Json(json!({
        "success": true,
        "user": user,
        "token": token,
        "expires_in": sessions.expires_in()
    })))
}

/// POST /create-user - provision an identity principal plus its profile row
///
/// Failures other than credential hashing answer 200 with an `error` field,
/// which is what existing admin tooling expects.
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    match ProvisioningService::new(&state).provision(&payload).await {
        Ok(user) => Ok(Json(json!({ "success": true, "user": user }))),
        Err(ProvisionError::Password(e)) => Err(e.into()),
        Err(err) => Ok(Json(provision_error_body(&err))),
    }
}

fn provision_error_body(err: &ProvisionError) -> Value {
    let mut body = json!({ "error": err.to_string() });
    if let Some(details) = err.details() {
        body["details"] = Value::String(details);
    }
    if let Some(orphan) = err.orphaned_principal() {
        body["orphaned_principal"] = Value::String(orphan.to_string());
    }
    body
}
