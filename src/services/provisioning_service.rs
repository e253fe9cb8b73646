use std::sync::Arc;

use thiserror::Error;

use crate::auth::{hash_password, secret_matches, PasswordError};
use crate::config::AppConfig;
use crate::filter::{Filter, FilterError};
use crate::models::{CreateUserRequest, User};
use crate::platform::{DataPlatform, NewPrincipal, PlatformError, Table};
use crate::state::AppState;

/// Progress of one provisioning run.
///
/// `Pending → PrincipalCreated → Committed` on success; a failed profile insert
/// moves `PrincipalCreated` to `RolledBack`, or `RollbackFailed` when the
/// principal could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionState {
    Pending,
    PrincipalCreated { principal_id: String },
    Committed { principal_id: String },
    RolledBack { principal_id: String },
    RollbackFailed { principal_id: String },
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("User already exists")]
    AlreadyExists(String),

    #[error("Failed to check existing users")]
    Lookup(#[source] PlatformError),

    #[error("Failed to create auth user")]
    Principal(#[source] PlatformError),

    #[error("Failed to create user profile")]
    Profile {
        #[source]
        source: PlatformError,
        state: ProvisionState,
    },

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Password hashing task failed: {0}")]
    Hashing(String),
}

impl ProvisionError {
    /// Extra detail for the response payload
    pub fn details(&self) -> Option<String> {
        match self {
            ProvisionError::AlreadyExists(email) => Some(email.clone()),
            ProvisionError::Lookup(e) | ProvisionError::Principal(e) => Some(e.to_string()),
            ProvisionError::Profile { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }

    /// Principal left behind when compensation failed
    pub fn orphaned_principal(&self) -> Option<&str> {
        match self {
            ProvisionError::Profile {
                state: ProvisionState::RollbackFailed { principal_id },
                ..
            } => Some(principal_id),
            _ => None,
        }
    }
}

/// Creates an identity principal and its `users` profile row as one unit
pub struct ProvisioningService {
    platform: Arc<dyn DataPlatform>,
    config: Arc<AppConfig>,
}

impl ProvisioningService {
    pub fn new(state: &AppState) -> Self {
        Self {
            platform: state.platform.clone(),
            config: state.config.clone(),
        }
    }

    pub async fn provision(&self, request: &CreateUserRequest) -> Result<User, ProvisionError> {
        if !secret_matches(&request.admin_token, &self.config.security.admin_token) {
            tracing::warn!("Provisioning rejected: bad admin token for {}", request.email);
            return Err(ProvisionError::Unauthorized);
        }

        if self.profile_exists(&request.email).await? {
            tracing::info!("Provisioning skipped: {} already has a profile", request.email);
            return Err(ProvisionError::AlreadyExists(request.email.clone()));
        }

        let password_hash = self.hash(&request.password).await?;

        let mut state = ProvisionState::Pending;
        tracing::info!("Provisioning {}: {:?}", request.email, state);

        let principal = self
            .platform
            .create_principal(&NewPrincipal {
                email: request.email.clone(),
                password: request.password.clone(),
                email_confirm: true,
                user_metadata: request.metadata(),
            })
            .await
            .map_err(|e| {
                tracing::error!("Provisioning {}: principal creation failed: {}", request.email, e);
                ProvisionError::Principal(e)
            })?;

        let principal_id = principal.id;
        transition(
            &request.email,
            &mut state,
            ProvisionState::PrincipalCreated {
                principal_id: principal_id.clone(),
            },
        );

        let row = request.to_row(&principal_id, &password_hash);
        match self.platform.insert(Table::Users, row).await {
            Ok(_) => {
                transition(
                    &request.email,
                    &mut state,
                    ProvisionState::Committed {
                        principal_id: principal_id.clone(),
                    },
                );
                // The profile is stored; the echoed representation is not needed.
                Ok(request.to_user(&principal_id))
            }
            Err(insert_error) => {
                tracing::error!(
                    "Provisioning {}: profile insert failed, rolling back principal {}: {}",
                    request.email,
                    principal_id,
                    insert_error
                );
                let next = match self.platform.delete_principal(&principal_id).await {
                    Ok(()) => ProvisionState::RolledBack {
                        principal_id: principal_id.clone(),
                    },
                    Err(rollback_error) => {
                        tracing::error!(
                            "Provisioning {}: rollback failed, principal {} is orphaned: {}",
                            request.email,
                            principal_id,
                            rollback_error
                        );
                        ProvisionState::RollbackFailed {
                            principal_id: principal_id.clone(),
                        }
                    }
                };
                transition(&request.email, &mut state, next);
                Err(ProvisionError::Profile {
                    source: insert_error,
                    state,
                })
            }
        }
    }

    async fn profile_exists(&self, email: &str) -> Result<bool, ProvisionError> {
        let filter = Filter::new().eq("email", email)?.limit(1)?;
        let rows = self
            .platform
            .select(Table::Users, &filter)
            .await
            .map_err(ProvisionError::Lookup)?;
        Ok(!rows.is_empty())
    }

    async fn hash(&self, password: &str) -> Result<String, ProvisionError> {
        let password = password.to_string();
        let cost = self.config.security.password_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| ProvisionError::Hashing(e.to_string()))?
            .map_err(ProvisionError::from)
    }
}

fn transition(email: &str, state: &mut ProvisionState, next: ProvisionState) {
    tracing::info!("Provisioning {}: {:?} -> {:?}", email, state, next);
    *state = next;
}
