//! Per-request authentication state machine
//!
//! One machine, two thin call sites: `require` for endpoints that demand an
//! identity, `optional` for legacy endpoints that tolerate anonymity. Both
//! share every step, so the two paths cannot drift.
//!
//! Order of checks, per request:
//! 1. no header            -> MissingCredential / None
//! 2. not "Bearer <token>" -> MalformedCredential
//! 3. signature/expiry     -> InvalidOrExpired
//! 4. claims shape         -> MalformedClaims
//! 5. user lookup          -> UnknownUser
//! 6. session registry     -> Revoked
//!
//! Authentication performs no writes; interrupting it mid-flight leaves no
//! partial state.

use sea_orm::{DatabaseConnection, EntityTrait};

use super::jwt::{verify_token, JwtConfig, TokenError};
use super::session::SessionRegistry;
use super::AuthError;
use crate::infrastructure::database::entities::user;

/// Authenticates bearer credentials against the token verifier, the user
/// store and the session registry.
#[derive(Clone)]
pub struct Authenticator {
    db: DatabaseConnection,
    jwt: JwtConfig,
    sessions: SessionRegistry,
}

impl Authenticator {
    pub fn new(db: DatabaseConnection, jwt: JwtConfig) -> Self {
        let sessions = SessionRegistry::new(db.clone());
        Self { db, jwt, sessions }
    }

    /// Authenticate a request that must carry an identity.
    pub async fn require(&self, header: Option<&str>) -> Result<user::Model, AuthError> {
        let header = header.ok_or(AuthError::MissingCredential)?;
        self.run(header).await
    }

    /// Authenticate a request that may be anonymous.
    ///
    /// An absent header short-circuits before any parsing; every later
    /// failure also degrades to `None` so anonymous-capable endpoints keep
    /// working.
    pub async fn optional(&self, header: Option<&str>) -> Option<user::Model> {
        let header = header?;
        match self.run(header).await {
            Ok(identity) => Some(identity),
            Err(AuthError::Internal(e)) => {
                tracing::warn!("optional auth degraded to anonymous on store failure: {}", e);
                None
            }
            Err(_) => None,
        }
    }

    async fn run(&self, header: &str) -> Result<user::Model, AuthError> {
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MalformedCredential)?;

        let claims = verify_token(token, &self.jwt).map_err(|e| match e {
            TokenError::MalformedClaims => AuthError::MalformedClaims,
            TokenError::Expired | TokenError::Invalid => AuthError::InvalidOrExpired,
        })?;

        let identity = user::Entity::find_by_id(claims.user_id)
            .one(&self.db)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        if !self.sessions.is_active(token).await? {
            return Err(AuthError::Revoked);
        }

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::issue_token;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};
    use chrono::{Duration, Utc};
    use sea_orm::{ActiveModelTrait, Set};
    use sea_orm_migration::MigratorTrait;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "authenticator-test-secret".to_string(),
            expire_minutes: 60,
        }
    }

    async fn setup() -> (Authenticator, SessionRegistry, i64) {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let now = Utc::now();
        let alice = user::ActiveModel {
            username: Set("alice".to_string()),
            email: Set("alice@example.com".to_string()),
            password_hash: Set("irrelevant".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let sessions = SessionRegistry::new(db.clone());
        (Authenticator::new(db, jwt_config()), sessions, alice.id)
    }

    /// Issue a token and record its session row, as login does.
    async fn login(sessions: &SessionRegistry, user_id: i64) -> String {
        let config = jwt_config();
        let token = issue_token(user_id, config.default_ttl(), &config).unwrap();
        let now = Utc::now();
        sessions
            .record(&token, user_id, now, now + config.default_ttl())
            .await
            .unwrap();
        token
    }

    #[tokio::test]
    async fn missing_header_fails_missing_credential() {
        let (auth, _, _) = setup().await;
        let err = auth.require(None).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential));
    }

    #[tokio::test]
    async fn non_bearer_header_fails_malformed_credential() {
        let (auth, _, _) = setup().await;
        let err = auth.require(Some("Token abc")).await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredential));
    }

    #[tokio::test]
    async fn garbage_token_fails_invalid_or_expired() {
        let (auth, _, _) = setup().await;
        let err = auth.require(Some("Bearer garbage")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpired));
    }

    #[tokio::test]
    async fn expired_token_fails_invalid_or_expired() {
        let (auth, sessions, user_id) = setup().await;
        let config = jwt_config();
        let token = issue_token(user_id, Duration::seconds(-1), &config).unwrap();
        // even a recorded session does not resurrect an expired token
        let now = Utc::now();
        sessions.record(&token, user_id, now, now).await.unwrap();

        let err = auth
            .require(Some(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOrExpired));
    }

    #[tokio::test]
    async fn unknown_user_fails_before_session_check() {
        let (auth, _, _) = setup().await;
        let config = jwt_config();
        let token = issue_token(99999, config.default_ttl(), &config).unwrap();

        let err = auth
            .require(Some(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownUser));
    }

    #[tokio::test]
    async fn valid_token_without_session_row_fails_revoked() {
        let (auth, _, user_id) = setup().await;
        let config = jwt_config();
        let token = issue_token(user_id, config.default_ttl(), &config).unwrap();

        let err = auth
            .require(Some(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Revoked));
    }

    #[tokio::test]
    async fn recorded_token_authenticates() {
        let (auth, sessions, user_id) = setup().await;
        let token = login(&sessions, user_id).await;

        let identity = auth.require(Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(identity.id, user_id);
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn revocation_takes_effect_immediately() {
        let (auth, sessions, user_id) = setup().await;
        let token = login(&sessions, user_id).await;
        let header = format!("Bearer {token}");

        assert!(auth.require(Some(&header)).await.is_ok());

        sessions.revoke(&token).await.unwrap();
        let err = auth.require(Some(&header)).await.unwrap_err();
        assert!(matches!(err, AuthError::Revoked));
    }

    #[tokio::test]
    async fn optional_degrades_every_failure_to_none() {
        let (auth, sessions, user_id) = setup().await;

        assert!(auth.optional(None).await.is_none());
        assert!(auth.optional(Some("Token abc")).await.is_none());
        assert!(auth.optional(Some("Bearer garbage")).await.is_none());

        let token = login(&sessions, user_id).await;
        let identity = auth.optional(Some(&format!("Bearer {token}"))).await;
        assert_eq!(identity.unwrap().id, user_id);
    }
}
