pub mod auth;
pub mod json;
pub mod path;
pub mod response;

pub use auth::{require_user, resolve_user, AuthUser, LEGACY_IDENTITY_HEADER};
pub use json::ValidJson;
pub use path::ValidPath;
pub use response::{ApiResponse, ApiResult};
