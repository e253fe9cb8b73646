use std::sync::Arc;

use thiserror::Error;

use crate::auth::{generate_jwt, verify_password, JwtError};
use crate::config::AppConfig;
use crate::filter::{Filter, FilterError};
use crate::models::User;
use crate::platform::{DataPlatform, PlatformError, Table};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),
    #[error("Token error: {0}")]
    Token(#[from] JwtError),
    #[error("Password verification task failed: {0}")]
    Verification(String),
}

/// Credential checks and token issuance for `/login`
pub struct SessionService {
    platform: Arc<dyn DataPlatform>,
    config: Arc<AppConfig>,
}

impl SessionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            platform: state.platform.clone(),
            config: state.config.clone(),
        }
    }

    /// The user whose stored hash matches `password`, if any.
    ///
    /// Unknown email, wrong password and unusable stored hashes all yield `None`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, SessionError> {
        let filter = Filter::new().eq("email", email)?.limit(1)?;
        let Some(row) = self.platform.select(Table::Users, &filter).await?.into_iter().next() else {
            tracing::info!("Login rejected: unknown email {}", email);
            return Ok(None);
        };

        let user = match User::from_row(row) {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("Malformed users row for {}: {}", email, e);
                return Ok(None);
            }
        };

        let Some(hash) = user.password.clone() else {
            tracing::warn!("Login rejected: user {} has no stored password", user.id);
            return Ok(None);
        };

        // bcrypt is deliberately slow; keep it off the async workers
        let candidate = password.to_string();
        let verified = tokio::task::spawn_blocking(move || verify_password(&candidate, &hash))
            .await
            .map_err(|e| SessionError::Verification(e.to_string()))?;

        if verified {
            tracing::info!("Login succeeded for {} ({})", user.email, user.id);
            Ok(Some(user))
        } else {
            tracing::info!("Login rejected: wrong password for {}", user.id);
            Ok(None)
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<String, SessionError> {
        Ok(generate_jwt(user, &self.config)?)
    }

    /// Token lifetime in seconds
    pub fn expires_in(&self) -> u64 {
        self.config.security.jwt_expiry_hours.saturating_mul(3600)
    }
}
