//! Server-side session registry
//!
//! Stateless signed tokens verify fast, but cannot be invalidated before
//! their embedded expiry. The registry adds that: a token authorizes a
//! request only while its row exists. The Authenticator checks both.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, Set,
};

use crate::infrastructure::database::entities::session_token;

/// Registry of currently-valid issued tokens.
#[derive(Clone)]
pub struct SessionRegistry {
    db: DatabaseConnection,
}

impl SessionRegistry {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record a freshly issued token. Called exactly once per successful
    /// login, after issuance succeeds.
    pub async fn record(
        &self,
        token: &str,
        user_id: i64,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        session_token::ActiveModel {
            token: Set(token.to_string()),
            user_id: Set(user_id),
            issued_at: Set(issued_at),
            expires_at: Set(expires_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    /// Presence check only. Expiry is the token verifier's job.
    pub async fn is_active(&self, token: &str) -> Result<bool, DbErr> {
        let found = session_token::Entity::find()
            .filter(session_token::Column::Token.eq(token))
            .one(&self.db)
            .await?;
        Ok(found.is_some())
    }

    /// Revoke a token by deleting its row. Revoking an unknown token is a
    /// no-op.
    pub async fn revoke(&self, token: &str) -> Result<(), DbErr> {
        let found = session_token::Entity::find()
            .filter(session_token::Column::Token.eq(token))
            .one(&self.db)
            .await?;
        if let Some(row) = found {
            row.delete(&self.db).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};
    use sea_orm_migration::MigratorTrait;

    async fn test_db() -> DatabaseConnection {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_user(db: &DatabaseConnection) -> i64 {
        use crate::infrastructure::database::entities::user;
        use sea_orm::Set;
        let now = Utc::now();
        let user = user::ActiveModel {
            username: Set("sessionuser".to_string()),
            email: Set("session@example.com".to_string()),
            password_hash: Set("x".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        user.id
    }

    #[tokio::test]
    async fn record_then_lookup_then_revoke() {
        let db = test_db().await;
        let user_id = seed_user(&db).await;
        let registry = SessionRegistry::new(db);

        let now = Utc::now();
        assert!(!registry.is_active("tok-1").await.unwrap());

        registry
            .record("tok-1", user_id, now, now + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert!(registry.is_active("tok-1").await.unwrap());

        registry.revoke("tok-1").await.unwrap();
        assert!(!registry.is_active("tok-1").await.unwrap());
    }

    #[tokio::test]
    async fn revoking_unknown_token_is_a_noop() {
        let db = test_db().await;
        let registry = SessionRegistry::new(db);
        registry.revoke("never-issued").await.unwrap();
    }
}
