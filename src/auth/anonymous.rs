//! Reserved anonymous identity
//!
//! Legacy math endpoints accept unauthenticated requests; their records
//! attach to a single reserved user provisioned once at startup. This
//! replaces a per-request lookup-or-create, which raced when two first
//! requests arrived concurrently.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use tracing::info;

use super::password::hash_password;
use crate::infrastructure::database::entities::user;

/// Reserved username; once the row exists the unique constraint stops
/// anyone from registering it.
pub const ANONYMOUS_USERNAME: &str = "anonymous";

/// Ensure the anonymous user exists and return its id.
///
/// Idempotent: a concurrent insert losing the unique-constraint race simply
/// re-reads the winner's row.
pub async fn ensure_anonymous_user(db: &DatabaseConnection) -> Result<i64, DbErr> {
    if let Some(existing) = find_anonymous(db).await? {
        return Ok(existing.id);
    }

    // Random throwaway credential; nobody logs in as the anonymous user.
    let placeholder = format!("reserved-{}", Utc::now().timestamp_nanos_opt().unwrap_or(0));
    let password_hash = hash_password(&placeholder)
        .map_err(|e| DbErr::Custom(format!("failed to hash placeholder password: {e}")))?;

    let now = Utc::now();
    let inserted = user::ActiveModel {
        username: Set(ANONYMOUS_USERNAME.to_string()),
        email: Set("anonymous@localhost".to_string()),
        password_hash: Set(password_hash),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await;

    match inserted {
        Ok(row) => {
            info!("Provisioned anonymous user (id {})", row.id);
            Ok(row.id)
        }
        // Lost the startup race; the winner's row is authoritative.
        Err(_) => match find_anonymous(db).await? {
            Some(existing) => Ok(existing.id),
            None => Err(DbErr::Custom(
                "anonymous user neither insertable nor readable".to_string(),
            )),
        },
    }
}

async fn find_anonymous(db: &DatabaseConnection) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Username.eq(ANONYMOUS_USERNAME))
        .one(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};
    use sea_orm_migration::MigratorTrait;

    #[tokio::test]
    async fn provisioning_is_idempotent() {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let first = ensure_anonymous_user(&db).await.unwrap();
        let second = ensure_anonymous_user(&db).await.unwrap();
        assert_eq!(first, second);

        use sea_orm::PaginatorTrait;
        let count = user::Entity::find().count(&db).await.unwrap();
        assert_eq!(count, 1);
    }
}
