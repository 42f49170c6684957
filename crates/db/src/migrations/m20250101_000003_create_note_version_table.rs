//! Create `note_version` table for content history.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NoteVersion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NoteVersion::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NoteVersion::NoteId).string_len(32).not_null())
                    .col(ColumnDef::new(NoteVersion::ContentMd).text().not_null())
                    .col(
                        ColumnDef::new(NoteVersion::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_note_version_note")
                            .from(NoteVersion::Table, NoteVersion::NoteId)
                            .to(Note::Table, Note::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_note_version_note_id_created_at")
                    .table(NoteVersion::Table)
                    .col(NoteVersion::NoteId)
                    .col(NoteVersion::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NoteVersion::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum NoteVersion {
    Table,
    Id,
    NoteId,
    ContentMd,
    CreatedAt,
}

#[derive(Iden)]
enum Note {
    Table,
    Id,
}
