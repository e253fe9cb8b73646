pub mod provisioning_service;
pub mod session_service;

pub use provisioning_service::{ProvisionError, ProvisionState, ProvisioningService};
pub use session_service::{SessionError, SessionService};
