//! Row filters for the platform table API.
//!
//! A `Filter` is an AND of equality conditions plus an optional limit. The REST
//! platform renders it as `column=eq.value` query pairs; the in-memory platform
//! evaluates it against JSON rows directly.

pub mod error;

use serde_json::Value;

pub use error::FilterError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, String)>,
    limit: Option<u32>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition on `column`
    pub fn eq(mut self, column: &str, value: impl ToString) -> Result<Self, FilterError> {
        Self::validate_column(column)?;
        self.conditions.push((column.to_string(), value.to_string()));
        Ok(self)
    }

    pub fn limit(mut self, limit: u32) -> Result<Self, FilterError> {
        if limit == 0 {
            return Err(FilterError::InvalidLimit("Limit must be positive".to_string()));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    /// Render as query pairs in the platform's `column=op.value` syntax
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .conditions
            .iter()
            .map(|(column, value)| (column.clone(), format!("eq.{}", value)))
            .collect();
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Whether a JSON row satisfies every condition
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|(column, expected)| {
            match row.get(column) {
                Some(Value::String(s)) => s == expected,
                Some(Value::Null) | None => false,
                Some(other) => other.to_string() == *expected,
            }
        })
    }

    fn validate_column(column: &str) -> Result<(), FilterError> {
        let valid = !column.is_empty()
            && column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !column.starts_with(|c: char| c.is_ascii_digit());
        if valid {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(column.to_string()))
        }
    }
}
