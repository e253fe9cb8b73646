use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::auth::{validate_jwt, Claims};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::models::User;
use crate::platform::Table;
use crate::state::AppState;

/// Unsigned identity header accepted only when explicitly enabled
pub const LEGACY_IDENTITY_HEADER: &str = "x-user-email";

/// Authenticated caller, resolved from the `users` table on every request
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// Where the caller's identity came from
#[derive(Debug)]
enum Identity {
    Token(Claims),
    LegacyHeader(String),
}

impl Identity {
    fn email(&self) -> &str {
        match self {
            Identity::Token(claims) => &claims.email,
            Identity::LegacyHeader(email) => email,
        }
    }
}

/// Middleware for protected routes: resolves the caller and injects `AuthUser`
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve_user(&state, request.headers()).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Resolve the acting user from request headers.
///
/// Credentials are checked before the single `users` lookup, so a request
/// without a usable credential never reaches the platform.
pub async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let identity = extract_identity(headers, state).map_err(|msg| {
        tracing::warn!("Authentication failed: {}", msg);
        ApiError::unauthorized(msg)
    })?;

    let filter = Filter::new().eq("email", identity.email())?.limit(1)?;
    let row = state
        .platform
        .select(Table::Users, &filter)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            tracing::warn!("Authentication failed: no user row for {}", identity.email());
            ApiError::unauthorized("Unknown user")
        })?;

    let user = User::from_row(row).map_err(|e| {
        tracing::error!("Malformed users row: {}", e);
        ApiError::bad_gateway("Unexpected response from data platform")
    })?;

    if let Identity::Token(claims) = &identity {
        if claims.sub != user.id {
            tracing::warn!(
                "Authentication failed: token subject {} does not match user {}",
                claims.sub,
                user.id
            );
            return Err(ApiError::unauthorized("Token does not match user"));
        }
    }

    tracing::debug!("Authenticated {} ({})", user.email, user.id);
    Ok(user.into())
}

fn extract_identity(headers: &HeaderMap, state: &AppState) -> Result<Identity, String> {
    if let Some(token) = extract_bearer(headers)? {
        let claims = validate_jwt(&token, &state.config).map_err(|e| e.to_string())?;
        return Ok(Identity::Token(claims));
    }

    if state.config.security.allow_legacy_identity_header {
        if let Some(value) = headers.get(LEGACY_IDENTITY_HEADER) {
            let email = value
                .to_str()
                .map_err(|_| format!("Invalid {} header", LEGACY_IDENTITY_HEADER))?
                .trim();
            if !email.is_empty() {
                return Ok(Identity::LegacyHeader(email.to_string()));
            }
        }
    }

    Err("Missing Authorization header".to_string())
}

/// Bearer token from the Authorization header, if the header is present
fn extract_bearer(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
