//! Create `activation_code` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivationCode::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivationCode::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivationCode::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(ActivationCode::Code).string_len(6).not_null())
                    .col(
                        ColumnDef::new(ActivationCode::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ActivationCode::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ActivationCode::IsUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activation_code_user")
                            .from(ActivationCode::Table, ActivationCode::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activation_code_user_id_code")
                    .table(ActivationCode::Table)
                    .col(ActivationCode::UserId)
                    .col(ActivationCode::Code)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivationCode::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ActivationCode {
    Table,
    Id,
    UserId,
    Code,
    CreatedAt,
    ExpiresAt,
    IsUsed,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
