//! In-memory `DataPlatform` used by the unit and integration tests.
//!
//! Records every call so tests can assert that a request never reached the
//! platform, and supports failure injection per operation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::filter::Filter;
use crate::platform::{DataPlatform, NewPrincipal, PlatformError, Principal, Table};

/// Operation that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Select(Table),
    Insert(Table),
    Update(Table),
    CreatePrincipal,
    DeletePrincipal,
    Health,
}

#[derive(Default)]
pub struct MemoryPlatform {
    tables: RwLock<HashMap<Table, Vec<Value>>>,
    principals: RwLock<HashMap<String, String>>,
    calls: RwLock<Vec<String>>,
    failures: RwLock<HashMap<FailPoint, (u16, String)>>,
    next_id: AtomicI64,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Store a row without recording a call
    pub async fn seed(&self, table: Table, row: Value) {
        self.tables.write().await.entry(table).or_default().push(row);
    }

    /// Register an identity principal without recording a call
    pub async fn seed_principal(&self, id: &str, email: &str) {
        self.principals
            .write()
            .await
            .insert(id.to_string(), email.to_string());
    }

    /// Make every future call at `point` fail with the given platform status
    pub async fn fail(&self, point: FailPoint, status: u16, message: &str) {
        self.failures
            .write()
            .await
            .insert(point, (status, message.to_string()));
    }

    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables.read().await.get(&table).cloned().unwrap_or_default()
    }

    /// Principal id → email
    pub async fn principals(&self) -> HashMap<String, String> {
        self.principals.read().await.clone()
    }

    /// Calls in order, e.g. `"select users"`, `"create_principal"`
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    async fn record(&self, call: String, point: FailPoint) -> Result<(), PlatformError> {
        self.calls.write().await.push(call);
        match self.failures.read().await.get(&point) {
            Some((status, message)) => Err(PlatformError::api(*status, message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataPlatform for MemoryPlatform {
    async fn select(&self, table: Table, filter: &Filter) -> Result<Vec<Value>, PlatformError> {
        self.record(format!("select {}", table), FailPoint::Select(table))
            .await?;

        let tables = self.tables.read().await;
        let matching = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|row| filter.matches(row)).cloned())
            .into_iter()
            .flatten();

        Ok(match filter.limit_value() {
            Some(limit) => matching.take(limit as usize).collect(),
            None => matching.collect(),
        })
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>, PlatformError> {
        self.record(format!("insert {}", table), FailPoint::Insert(table))
            .await?;

        let Value::Object(mut row) = row else {
            return Err(PlatformError::api(400, "Row must be a JSON object"));
        };

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();

        if table == Table::Users {
            let duplicate = rows.iter().any(|existing| existing.get("email") == row.get("email"));
            if duplicate {
                return Err(PlatformError::api(
                    409,
                    "duplicate key value violates unique constraint \"users_email_key\"",
                ));
            }
        } else if !row.contains_key("id") {
            row.insert("id".into(), json!(self.next_id.fetch_add(1, Ordering::SeqCst)));
        }
        row.entry("created_at")
            .or_insert_with(|| json!(chrono::Utc::now().to_rfc3339()));

        let stored = Value::Object(row);
        rows.push(stored.clone());
        Ok(vec![stored])
    }

    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, PlatformError> {
        self.record(format!("update {}", table), FailPoint::Update(table))
            .await?;

        let Value::Object(patch) = patch else {
            return Err(PlatformError::api(400, "Patch must be a JSON object"));
        };

        let mut tables = self.tables.write().await;
        let mut updated = vec![];
        for row in tables.entry(table).or_default().iter_mut() {
            if !filter.matches(row) {
                continue;
            }
            if let Value::Object(fields) = row {
                for (key, value) in &patch {
                    fields.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn create_principal(&self, principal: &NewPrincipal) -> Result<Principal, PlatformError> {
        self.record("create_principal".to_string(), FailPoint::CreatePrincipal)
            .await?;

        let mut principals = self.principals.write().await;
        if principals.values().any(|email| *email == principal.email) {
            return Err(PlatformError::api(
                422,
                "A user with this email address has already been registered",
            ));
        }

        let id = Uuid::new_v4().to_string();
        principals.insert(id.clone(), principal.email.clone());
        Ok(Principal {
            id,
            email: Some(principal.email.clone()),
        })
    }

    async fn delete_principal(&self, id: &str) -> Result<(), PlatformError> {
        self.record("delete_principal".to_string(), FailPoint::DeletePrincipal)
            .await?;

        match self.principals.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(PlatformError::api(404, "User not found")),
        }
    }

    async fn health_check(&self) -> Result<(), PlatformError> {
        self.record("health".to_string(), FailPoint::Health).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_ids_and_select_filters() {
        let platform = MemoryPlatform::new();
        platform
            .insert(Table::Visits, json!({ "user_id": "a", "customer": "Acme" }))
            .await
            .unwrap();
        platform
            .insert(Table::Visits, json!({ "user_id": "b", "customer": "Globex" }))
            .await
            .unwrap();

        let filter = Filter::new().eq("user_id", "b").unwrap();
        let rows = platform.select(Table::Visits, &filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["customer"], "Globex");
        assert_eq!(rows[0]["id"], 2);
        assert_eq!(
            platform.calls().await,
            vec!["insert visits", "insert visits", "select visits"]
        );
    }

    #[tokio::test]
    async fn update_only_touches_matching_rows() {
        let platform = MemoryPlatform::new();
        platform.seed(Table::Visits, json!({ "id": 1, "user_id": "a", "notes": "x" })).await;
        platform.seed(Table::Visits, json!({ "id": 2, "user_id": "b", "notes": "y" })).await;

        let filter = Filter::new().eq("id", 2).unwrap().eq("user_id", "a").unwrap();
        let updated = platform
            .update(Table::Visits, &filter, json!({ "notes": "hijacked" }))
            .await
            .unwrap();
        assert!(updated.is_empty());
        assert_eq!(platform.rows(Table::Visits).await[1]["notes"], "y");
    }

    #[tokio::test]
    async fn injected_failures_are_returned() {
        let platform = MemoryPlatform::new();
        platform.fail(FailPoint::Insert(Table::Feedbacks), 503, "maintenance").await;

        let err = platform
            .insert(Table::Feedbacks, json!({ "message": "hi" }))
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Api { status: 503, .. }));
        assert!(platform.rows(Table::Feedbacks).await.is_empty());
    }
}
