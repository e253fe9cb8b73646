//! Access to the hosted data platform.
//!
//! Handlers never talk to the network directly: they receive an
//! `Arc<dyn DataPlatform>` through application state. `RestPlatform` is the
//! production implementation; `crate::testing::MemoryPlatform` backs the tests.

pub mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::filter::{Filter, FilterError};

pub use rest::RestPlatform;

/// Errors returned by platform calls
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Transport failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-success status
    #[error("Platform error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The platform answered with a body we could not decode
    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl PlatformError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        PlatformError::Api {
            status,
            message: message.into(),
        }
    }
}

/// Remote tables used by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Feedbacks,
    Visits,
    Opportunities,
    Users,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Feedbacks => "feedbacks",
            Table::Visits => "visits",
            Table::Opportunities => "opportunities",
            Table::Users => "users",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity principal to create through the admin identity API
#[derive(Debug, Clone, Serialize)]
pub struct NewPrincipal {
    pub email: String,
    pub password: String,
    pub email_confirm: bool,
    pub user_metadata: Value,
}

/// Principal as returned by the admin identity API
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[async_trait]
pub trait DataPlatform: Send + Sync {
    /// Rows of `table` matching `filter`
    async fn select(&self, table: Table, filter: &Filter) -> Result<Vec<Value>, PlatformError>;

    /// Insert one row, returning the rows as stored
    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>, PlatformError>;

    /// Apply `patch` to every row matching `filter`, returning the updated rows
    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, PlatformError>;

    async fn create_principal(&self, principal: &NewPrincipal) -> Result<Principal, PlatformError>;

    async fn delete_principal(&self, id: &str) -> Result<(), PlatformError>;

    async fn health_check(&self) -> Result<(), PlatformError>;
}
