use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Response;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;

use super::{DataPlatform, NewPrincipal, PlatformError, Principal, Table};
use crate::config::PlatformConfig;
use crate::filter::Filter;

/// Table API path prefix
const REST_PATH: &str = "rest/v1";

/// Admin identity API path prefix
const ADMIN_USERS_PATH: &str = "auth/v1/admin/users";

/// Platform client speaking the PostgREST table API and the admin identity API.
///
/// Every request carries the service-role key, so this client bypasses
/// row-level security; ownership scoping is the caller's job.
#[derive(Clone)]
pub struct RestPlatform {
    client: reqwest::Client,
    base_url: String,
}

impl RestPlatform {
    pub fn new(config: &PlatformConfig) -> Result<Self, PlatformError> {
        let key = config.service_role_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| PlatformError::Parse(format!("Invalid service key format: {e}")))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| PlatformError::Parse(format!("Invalid service key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH, table)
    }

    fn admin_users_url(&self) -> String {
        format!("{}/{}", self.base_url, ADMIN_USERS_PATH)
    }

    async fn rows(response: Response) -> Result<Vec<Value>, PlatformError> {
        let response = check_status(response).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| PlatformError::Parse(e.to_string()))
    }
}

#[async_trait]
impl DataPlatform for RestPlatform {
    async fn select(&self, table: Table, filter: &Filter) -> Result<Vec<Value>, PlatformError> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(filter.to_query_pairs());
        debug!("platform select {} {:?}", table, query);

        let response = self
            .client
            .get(self.table_url(table))
            .query(&query)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>, PlatformError> {
        debug!("platform insert {}", table);

        let response = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, PlatformError> {
        let query = filter.to_query_pairs();
        debug!("platform update {} {:?}", table, query);

        let response = self
            .client
            .patch(self.table_url(table))
            .query(&query)
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn create_principal(&self, principal: &NewPrincipal) -> Result<Principal, PlatformError> {
        debug!("platform create principal {}", principal.email);

        let response = self
            .client
            .post(self.admin_users_url())
            .json(principal)
            .send()
            .await?;
        let response = check_status(response).await?;
        response
            .json::<Principal>()
            .await
            .map_err(|e| PlatformError::Parse(e.to_string()))
    }

    async fn delete_principal(&self, id: &str) -> Result<(), PlatformError> {
        debug!("platform delete principal {}", id);

        let response = self
            .client
            .delete(format!("{}/{}", self.admin_users_url(), id))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), PlatformError> {
        let response = self
            .client
            .get(format!("{}/{}/", self.base_url, REST_PATH))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Pass through success responses, turn everything else into `PlatformError::Api`
async fn check_status(response: Response) -> Result<Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(PlatformError::api(status.as_u16(), error_message(&body)))
}

/// Pull the human-readable message out of a platform error body.
///
/// The table API uses `message`; the identity API uses `msg`,
/// `error_description` or `error`. Anything else is returned verbatim.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    body.trim().to_string()
}
