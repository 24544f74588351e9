//! Create calculations table

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Calculations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Calculations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Calculations::A).double().not_null())
                    .col(ColumnDef::new(Calculations::B).double().not_null())
                    .col(ColumnDef::new(Calculations::Operation).string().not_null())
                    .col(ColumnDef::new(Calculations::Result).double().not_null())
                    .col(
                        ColumnDef::new(Calculations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Calculations::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_calculations_user_id")
                            .from(Calculations::Table, Calculations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_calculations_user_id")
                    .table(Calculations::Table)
                    .col(Calculations::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Calculations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Calculations {
    Table,
    Id,
    A,
    B,
    Operation,
    Result,
    CreatedAt,
    UserId,
}
