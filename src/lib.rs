//! Calculation service: an HTTP API for authenticated calculations.
//!
//! Accounts register and log in with bcrypt-hashed passwords; sessions are
//! JWT bearer tokens backed by a revocation registry, so logout takes effect
//! immediately. Every calculation is owned by an account, with a reserved
//! anonymous account owning the ones made without credentials.

pub mod api;
pub mod auth;
pub mod calc;
pub mod config;
pub mod infrastructure;

pub use api::{create_api_router, ApiState};
pub use config::AppConfig;
