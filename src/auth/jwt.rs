//! Access token issuance and verification
//!
//! Tokens are HS256 JWTs carrying a closed claims structure. A token that
//! decodes at all is guaranteed to have a user id and expiry; missing or
//! mistyped claims fail decoding rather than surfacing later as key lookups.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Default token lifetime in minutes
    pub expire_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-me".to_string()),
            expire_minutes: std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

impl JwtConfig {
    /// Default token lifetime.
    pub fn default_ttl(&self) -> Duration {
        Duration::minutes(self.expire_minutes)
    }
}

/// Token claims. Closed structure: decoding validates shape and types.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccessClaims {
    /// Owning user id
    pub user_id: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    /// Create claims for a user with the given lifetime.
    ///
    /// A negative `ttl` produces an already-expired token (used by tests).
    pub fn new(user_id: i64, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

/// Token verification failures, distinguishable even though both currently
/// surface as 401 at the HTTP layer.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token claims are malformed")]
    MalformedClaims,
    #[error("token signature or structure is invalid")]
    Invalid,
}

/// Issue a signed access token for a user.
pub fn issue_token(
    user_id: i64,
    ttl: Duration,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = AccessClaims::new(user_id, ttl);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode an access token.
///
/// Expiry is checked against the verifier's own clock with zero leeway, so
/// an already-expired token fails immediately.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<AccessClaims, TokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::Json(_)
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => TokenError::MalformedClaims,
        _ => TokenError::Invalid,
    })?;

    Ok(token_data.claims)
}
