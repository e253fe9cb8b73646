//! Row and payload shapes for the remote tables.
//!
//! Request models only check presence and JSON type; anything further is the
//! platform's business.

pub mod feedback;
pub mod opportunity;
pub mod user;
pub mod visit;

pub use feedback::FeedbackRequest;
pub use opportunity::OpportunityRequest;
pub use user::{CreateUserRequest, LoginRequest, User};
pub use visit::VisitRequest;

/// Column holding the owning user's id on owned tables
pub const OWNER_COLUMN: &str = "user_id";
