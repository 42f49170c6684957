//! Note entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum title length, in characters.
pub const TITLE_MAX_LEN: u64 = 200;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "note")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owner user ID
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Title, possibly empty
    pub title: String,

    /// Raw Markdown as written by the owner
    #[sea_orm(column_type = "Text")]
    pub content_md: String,

    /// Sanitized HTML rendered from `content_md` on the last full save.
    /// Never written directly.
    #[sea_orm(column_type = "Text")]
    pub content_html: String,

    #[sea_orm(default_value = false)]
    pub is_public: bool,

    /// Opaque share identifier, fixed at creation
    #[sea_orm(unique)]
    pub public_uuid: String,

    #[sea_orm(default_value = 0)]
    pub views: i32,

    #[sea_orm(default_value = false)]
    pub is_favorite: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::note_version::Entity")]
    NoteVersion,
    #[sea_orm(has_many = "super::note_tag::Entity")]
    NoteTag,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::note_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NoteVersion.def()
    }
}

impl Related<super::note_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NoteTag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
