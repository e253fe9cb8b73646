use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::OWNER_COLUMN;

/// Body of POST /visits and PUT /visits/:id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRequest {
    pub date: String,
    pub customer: String,
    pub purpose: String,
    pub notes: String,
    /// Added after the first release; older clients omit it
    #[serde(default)]
    pub location: Option<String>,
}

impl VisitRequest {
    /// Columns for an insert owned by `owner_id`
    pub fn to_row(&self, owner_id: &str) -> Value {
        let mut row = self.columns();
        row.insert(OWNER_COLUMN.to_string(), Value::String(owner_id.to_string()));
        Value::Object(row)
    }

    /// Columns for an update. The owner column is never part of a patch.
    pub fn to_patch(&self) -> Value {
        Value::Object(self.columns())
    }

    fn columns(&self) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("date".into(), Value::String(self.date.clone()));
        row.insert("customer".into(), Value::String(self.customer.clone()));
        row.insert("purpose".into(), Value::String(self.purpose.clone()));
        row.insert("notes".into(), Value::String(self.notes.clone()));
        if let Some(location) = &self.location {
            row.insert("location".into(), Value::String(location.clone()));
        }
        row
    }
}
