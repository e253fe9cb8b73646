use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Row of the `users` table.
///
/// `password` holds a bcrypt hash and is never serialized back out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    pub fn from_row(row: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(row)
    }
}

/// POST /login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /create-user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub admin_token: String,
}

impl CreateUserRequest {
    /// Profile row for the `users` table, keyed by the principal id
    pub fn to_row(&self, principal_id: &str, password_hash: &str) -> Value {
        json!({
            "id": principal_id,
            "email": self.email,
            "password": password_hash,
            "name": self.name,
            "role": self.role,
        })
    }

    /// The committed profile, without the password hash
    pub fn to_user(&self, principal_id: &str) -> User {
        User {
            id: principal_id.to_string(),
            email: self.email.clone(),
            password: None,
            name: Some(self.name.clone()),
            role: Some(self.role.clone()),
        }
    }

    pub fn metadata(&self) -> Value {
        json!({
            "name": self.name,
            "role": self.role,
        })
    }
}
