//! Authentication and authorization
//!
//! - `password`: bcrypt credential hashing (72-byte ceiling)
//! - `jwt`: signed access-token issuance and verification
//! - `session`: server-side revocation list backed by the database
//! - `authenticator`: the per-request authentication state machine
//! - `guard`: per-owner resource isolation
//! - `middleware`: axum glue (required and optional variants)
//! - `anonymous`: the reserved identity legacy endpoints attach to

pub mod anonymous;
pub mod authenticator;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub use authenticator::Authenticator;
pub use session::SessionRegistry;

/// Authentication failures. All map to HTTP 401 with a `detail` string
/// distinguishing the cause; none are retried within a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingCredential,
    #[error("Invalid Authorization header format, expected 'Bearer <token>'")]
    MalformedCredential,
    #[error("Invalid or expired token")]
    InvalidOrExpired,
    #[error("Malformed token claims")]
    MalformedClaims,
    #[error("Token user not found")]
    UnknownUser,
    #[error("Session revoked")]
    Revoked,
    /// Store failure during authentication; not an auth outcome.
    #[error("Internal error")]
    Internal(#[from] sea_orm::DbErr),
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(ref e) = self {
            tracing::error!("authentication store failure: {}", e);
        }
        let body = Json(json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}
