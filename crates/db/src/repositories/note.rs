//! Note repository.
//!
//! Notes, their version history and their tags. Owner scoping happens here:
//! `find_owned` and `list` never return another user's note.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Note, NoteTag, NoteVersion, note, note_tag, note_version};
use notebook_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
    sea_query::{Expr, Func, LikeExpr},
};

/// Filters for an owner's note listing. `None` and `false` mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Case-insensitive substring of the title or the Markdown body.
    pub search: Option<String>,
    /// Exact tag name.
    pub tag: Option<String>,
    pub favorites_only: bool,
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct NotePage {
    pub notes: Vec<note::Model>,
    /// 1-based page actually returned, after clamping.
    pub page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Per-owner counters for the profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteStats {
    pub total: u64,
    pub favorites: u64,
    pub public: u64,
    pub total_views: i64,
}

/// Note repository for database operations.
#[derive(Clone)]
pub struct NoteRepository {
    db: Arc<DatabaseConnection>,
}

impl NoteRepository {
    /// Create a new note repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a note by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<note::Model>> {
        Note::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a note by ID if `user_id` owns it.
    pub async fn find_owned(&self, id: &str, user_id: &str) -> AppResult<Option<note::Model>> {
        Note::find_by_id(id)
            .filter(note::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an owned note, returning an error if missing or owned by someone else.
    pub async fn get_owned(&self, id: &str, user_id: &str) -> AppResult<note::Model> {
        self.find_owned(id, user_id)
            .await?
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))
    }

    /// Find a shared note. Notes that are not public are invisible here.
    pub async fn find_public_by_uuid(&self, public_uuid: &str) -> AppResult<Option<note::Model>> {
        Note::find()
            .filter(note::Column::PublicUuid.eq(public_uuid))
            .filter(note::Column::IsPublic.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new note.
    pub async fn create(&self, model: note::ActiveModel) -> AppResult<note::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a note. Only columns set on the active model are written.
    ///
    /// A row that no longer exists reports as [`AppError::NoteNotFound`].
    pub async fn update(&self, model: note::ActiveModel) -> AppResult<note::Model> {
        let id = match &model.id {
            ActiveValue::Set(id) | ActiveValue::Unchanged(id) => id.clone(),
            ActiveValue::NotSet => String::new(),
        };

        model.update(self.db.as_ref()).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::NoteNotFound(id),
            e => AppError::Database(e.to_string()),
        })
    }

    /// Delete a note. Versions and tags go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Note::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Filtered, sorted, paginated listing of one owner's notes.
    ///
    /// `page` is 1-based and clamped to the last page; an empty result still
    /// reports page 1 of 1.
    pub async fn list(
        &self,
        user_id: &str,
        filter: &NoteFilter,
        sort_column: note::Column,
        order: Order,
        page: u64,
        page_size: u64,
    ) -> AppResult<NotePage> {
        let mut condition = Condition::all().add(note::Column::UserId.eq(user_id));

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            condition = condition.add(search_condition(search));
        }

        if let Some(tag) = filter.tag.as_deref().filter(|t| !t.is_empty()) {
            condition = condition.add(
                note::Column::Id.in_subquery(
                    NoteTag::find()
                        .select_only()
                        .column(note_tag::Column::NoteId)
                        .filter(note_tag::Column::Name.eq(tag))
                        .into_query(),
                ),
            );
        }

        if filter.favorites_only {
            condition = condition.add(note::Column::IsFavorite.eq(true));
        }

        let paginator = Note::find()
            .filter(condition)
            .order_by(sort_column, order.clone())
            .order_by(note::Column::Id, order)
            .paginate(self.db.as_ref(), page_size);

        let totals = paginator
            .num_items_and_pages()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let total_pages = totals.number_of_pages.max(1);
        let page = page.clamp(1, total_pages);

        let notes = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(NotePage {
            notes,
            page,
            total_items: totals.number_of_items,
            total_pages,
        })
    }

    /// Profile counters for one owner.
    pub async fn stats_for_user(&self, user_id: &str) -> AppResult<NoteStats> {
        let total = self.count_where(user_id, None).await?;
        let favorites = self
            .count_where(user_id, Some(note::Column::IsFavorite))
            .await?;
        let public = self
            .count_where(user_id, Some(note::Column::IsPublic))
            .await?;

        let views = Note::find()
            .select_only()
            .column(note::Column::Views)
            .filter(note::Column::UserId.eq(user_id))
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(NoteStats {
            total,
            favorites,
            public,
            total_views: views.into_iter().map(i64::from).sum(),
        })
    }

    async fn count_where(&self, user_id: &str, flag: Option<note::Column>) -> AppResult<u64> {
        let mut query = Note::find().filter(note::Column::UserId.eq(user_id));
        if let Some(column) = flag {
            query = query.filter(column.eq(true));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Versions ====================

    /// Record a version snapshot.
    pub async fn create_version(
        &self,
        model: note_version::ActiveModel,
    ) -> AppResult<note_version::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Versions of a note, newest first.
    pub async fn find_versions(
        &self,
        note_id: &str,
        limit: Option<u64>,
    ) -> AppResult<Vec<note_version::Model>> {
        NoteVersion::find()
            .filter(note_version::Column::NoteId.eq(note_id))
            .order_by_desc(note_version::Column::CreatedAt)
            .order_by_desc(note_version::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count versions of a note.
    pub async fn count_versions(&self, note_id: &str) -> AppResult<u64> {
        NoteVersion::find()
            .filter(note_version::Column::NoteId.eq(note_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Tags ====================

    /// Replace a note's tags.
    pub async fn replace_tags(
        &self,
        note_id: &str,
        tags: Vec<note_tag::ActiveModel>,
    ) -> AppResult<()> {
        NoteTag::delete_many()
            .filter(note_tag::Column::NoteId.eq(note_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if tags.is_empty() {
            return Ok(());
        }

        NoteTag::insert_many(tags)
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Tag names of one note, sorted.
    pub async fn find_tags(&self, note_id: &str) -> AppResult<Vec<String>> {
        NoteTag::find()
            .select_only()
            .column(note_tag::Column::Name)
            .filter(note_tag::Column::NoteId.eq(note_id))
            .order_by_asc(note_tag::Column::Name)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tag names for many notes at once, keyed by note ID.
    pub async fn find_tags_for_notes(
        &self,
        note_ids: &[String],
    ) -> AppResult<HashMap<String, Vec<String>>> {
        if note_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = NoteTag::find()
            .filter(note_tag::Column::NoteId.is_in(note_ids.to_vec()))
            .order_by_asc(note_tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut by_note: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            by_note.entry(row.note_id).or_default().push(row.name);
        }
        Ok(by_note)
    }

    /// Distinct tag names across all of an owner's notes, sorted.
    pub async fn find_distinct_tags(&self, user_id: &str) -> AppResult<Vec<String>> {
        let mut names = NoteTag::find()
            .select_only()
            .column(note_tag::Column::Name)
            .distinct()
            .filter(
                note_tag::Column::NoteId.in_subquery(
                    Note::find()
                        .select_only()
                        .column(note::Column::Id)
                        .filter(note::Column::UserId.eq(user_id))
                        .into_query(),
                ),
            )
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// `%needle%` with LIKE metacharacters escaped by `\`, lowercased.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Title or body contains `search`, ignoring case.
///
/// The needle is folded in Rust with full Unicode rules; the column side is
/// SQL `lower()`, which on Postgres follows the database collation and on
/// SQLite only folds ASCII.
fn search_condition(search: &str) -> Condition {
    let pattern = contains_pattern(search);
    Condition::any()
        .add(lower_like(note::Column::Title, &pattern))
        .add(lower_like(note::Column::ContentMd, &pattern))
}

fn lower_like(column: note::Column, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}
