pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod platform;
pub mod services;
pub mod state;
pub mod testing;

pub use app::app;
