//! Create note table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Note::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Note::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Note::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Note::Title).string_len(200).not_null().default(""))
                    .col(ColumnDef::new(Note::ContentMd).text().not_null())
                    .col(ColumnDef::new(Note::ContentHtml).text().not_null())
                    .col(ColumnDef::new(Note::IsPublic).boolean().not_null().default(false))
                    .col(ColumnDef::new(Note::PublicUuid).string_len(36).not_null())
                    .col(ColumnDef::new(Note::Views).integer().not_null().default(0))
                    .col(ColumnDef::new(Note::IsFavorite).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Note::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Note::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_note_user")
                            .from(Note::Table, Note::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (every listing is per owner)
        manager
            .create_index(
                Index::create()
                    .name("idx_note_user_id")
                    .table(Note::Table)
                    .col(Note::UserId)
                    .to_owned(),
            )
            .await?;

        // Unique index: public_uuid
        manager
            .create_index(
                Index::create()
                    .name("idx_note_public_uuid")
                    .table(Note::Table)
                    .col(Note::PublicUuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: updated_at (default listing order)
        manager
            .create_index(
                Index::create()
                    .name("idx_note_updated_at")
                    .table(Note::Table)
                    .col(Note::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Note::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Note {
    Table,
    Id,
    UserId,
    Title,
    ContentMd,
    ContentHtml,
    IsPublic,
    PublicUuid,
    Views,
    IsFavorite,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
