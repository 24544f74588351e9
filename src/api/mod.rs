//! HTTP API: routing, DTOs and handlers.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod validated_json;

pub use router::{create_api_router, ApiState};
