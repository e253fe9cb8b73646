// handlers/mod.rs - Two-tier handler layout
//
// Public (no credentials) → Protected (caller resolved by `require_user`)
pub mod protected;
pub mod public;
