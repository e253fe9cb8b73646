use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::OWNER_COLUMN;

/// Body of POST /opportunity and PUT /opportunity/:id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityRequest {
    pub customer: String,
    pub description: String,
    pub notes: String,
    /// Pipeline stage
    pub stage: i32,
}

impl OpportunityRequest {
    pub fn to_row(&self, owner_id: &str) -> Value {
        let mut row = self.to_patch();
        row[OWNER_COLUMN] = Value::String(owner_id.to_string());
        row
    }

    pub fn to_patch(&self) -> Value {
        json!({
            "customer": self.customer,
            "description": self.description,
            "notes": self.notes,
            "stage": self.stage,
        })
    }
}
