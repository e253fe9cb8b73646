use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// POST /feedback payload. Anonymous, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub user_email: String,
    pub message: String,
}

impl FeedbackRequest {
    pub fn to_row(&self) -> Value {
        json!({
            "user_email": self.user_email,
            "message": self.message,
        })
    }
}
