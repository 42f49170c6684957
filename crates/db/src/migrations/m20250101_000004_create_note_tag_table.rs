//! Create `note_tag` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NoteTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(NoteTag::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(NoteTag::NoteId).string_len(32).not_null())
                    .col(ColumnDef::new(NoteTag::Name).string_len(100).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_note_tag_note")
                            .from(NoteTag::Table, NoteTag::NoteId)
                            .to(Note::Table, Note::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: a tag appears once per note
        manager
            .create_index(
                Index::create()
                    .name("idx_note_tag_note_id_name")
                    .table(NoteTag::Table)
                    .col(NoteTag::NoteId)
                    .col(NoteTag::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: name (tag filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_note_tag_name")
                    .table(NoteTag::Table)
                    .col(NoteTag::Name)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NoteTag::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum NoteTag {
    Table,
    Id,
    NoteId,
    Name,
}

#[derive(Iden)]
enum Note {
    Table,
    Id,
}
