//! User entity for database

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::calculation::Entity")]
    Calculations,
    #[sea_orm(has_many = "super::session_token::Entity")]
    SessionTokens,
}

impl Related<super::calculation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Calculations.def()
    }
}

impl Related<super::session_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SessionTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
