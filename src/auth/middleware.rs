//! Axum middleware wiring for the authenticator.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;

use super::authenticator::Authenticator;
use super::jwt::JwtConfig;
use crate::infrastructure::database::entities::user;

/// State shared by the auth middlewares.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Authenticator,
}

impl AuthState {
    pub fn new(db: DatabaseConnection, jwt: JwtConfig) -> Self {
        Self {
            authenticator: Authenticator::new(db, jwt),
        }
    }
}

/// The authenticated user for the current request.
#[derive(Clone)]
pub struct CurrentUser(pub user::Model);

/// The raw bearer token for the current request, kept for logout.
#[derive(Clone)]
pub struct BearerToken(pub String);

fn authorization_header(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Rejects the request with 401 unless it carries a valid, live session.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = authorization_header(&request).map(str::to_owned);
    match state.authenticator.require(header.as_deref()).await {
        Ok(identity) => {
            // the "Bearer " prefix survived require(), so the strip is total
            if let Some(token) = header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) {
                request.extensions_mut().insert(BearerToken(token.to_owned()));
            }
            request.extensions_mut().insert(CurrentUser(identity));
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Attaches the current user when credentials are present and valid,
/// otherwise lets the request through anonymously.
pub async fn optional_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = authorization_header(&request).map(str::to_owned);
    if let Some(identity) = state.authenticator.optional(header.as_deref()).await {
        request.extensions_mut().insert(CurrentUser(identity));
    }
    next.run(request).await
}
