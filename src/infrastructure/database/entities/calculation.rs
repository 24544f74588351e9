//! Calculation entity for database

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Calculation record: operands, operation kind, result and owner
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calculations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub a: f64,
    pub b: f64,
    /// Operation kind: add, subtract, multiply, divide, modulus, exponent
    pub operation: String,
    pub result: f64,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
