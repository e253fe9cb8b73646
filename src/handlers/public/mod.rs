// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Liveness and demo endpoints, token acquisition, anonymous feedback and
// user provisioning (which carries its own admin token in the body).

pub mod auth;
pub mod feedback;
pub mod info;
