// handlers/protected/mod.rs - Protected handlers (caller must be resolved)
//
// Every route here sits behind `middleware::require_user`, which injects the
// `AuthUser` extension. Reads and writes on owned tables are always scoped
// to that user's id.

pub mod auth;
pub mod opportunities;
pub mod visits;

mod owned;
