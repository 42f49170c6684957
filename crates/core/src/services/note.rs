//! Note service.
//!
//! Every write to a note's content goes through [`NoteService::save`], which
//! runs a fixed pipeline: render the Markdown to sanitized HTML, snapshot the
//! previous content if it changed, then persist.

use chrono::Utc;
use notebook_common::{AppError, AppResult, IdGenerator};
use notebook_db::{
    entities::{note, note::TITLE_MAX_LEN, note_tag, note_version},
    repositories::{NoteFilter, NoteRepository},
};
use notebook_markdown::render_to_safe_html;
use sea_orm::{ActiveValue, Set};
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use crate::services::listing::{ListQuery, PAGE_SIZE, SortKey};

/// Versions shown on the detail view.
pub const RECENT_VERSIONS: u64 = 5;

/// Maximum length of one tag name, in characters.
pub const TAG_MAX_LEN: usize = 100;

/// Note service for business logic.
#[derive(Clone)]
pub struct NoteService {
    note_repo: NoteRepository,
    id_gen: IdGenerator,
}

/// Input for creating a note.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteInput {
    #[validate(length(max = TITLE_MAX_LEN))]
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content_md: String,

    #[serde(default)]
    pub is_public: bool,

    #[serde(default)]
    pub is_favorite: bool,

    /// Comma-separated tag names.
    #[serde(default)]
    pub tags: Option<String>,
}

/// Input for editing a note. Title, content and flags are replaced as a
/// whole.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteInput {
    #[validate(length(max = TITLE_MAX_LEN))]
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content_md: String,

    #[serde(default)]
    pub is_public: bool,

    #[serde(default)]
    pub is_favorite: bool,

    /// Comma-separated tag names. `None` keeps the current tags, an empty
    /// string clears them.
    #[serde(default)]
    pub tags: Option<String>,
}

/// Input for autosave. Missing fields keep their stored value. Unknown
/// fields are rejected.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AutosaveInput {
    #[validate(length(max = TITLE_MAX_LEN))]
    pub title: Option<String>,

    #[serde(alias = "content_md")]
    pub content_md: Option<String>,
}

/// A note with its tag names.
#[derive(Debug, Clone)]
pub struct NoteWithTags {
    pub note: note::Model,
    pub tags: Vec<String>,
}

/// Owner's view of a note.
#[derive(Debug, Clone)]
pub struct NoteDetail {
    pub note: note::Model,
    pub tags: Vec<String>,
    /// Newest first, at most [`RECENT_VERSIONS`].
    pub recent_versions: Vec<note_version::Model>,
}

/// One page of an owner's listing.
#[derive(Debug, Clone)]
pub struct NoteListPage {
    pub notes: Vec<NoteWithTags>,
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub sort: SortKey,
    /// Every tag the owner uses, for the filter menu.
    pub all_tags: Vec<String>,
}

/// Output of the pure part of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    pub content_html: String,
    /// Content to record as a version, if any.
    pub snapshot: Option<String>,
}

/// Whether a save should record the previous content as a version.
#[must_use]
pub fn should_snapshot(old_md: &str, new_md: &str, note_is_new: bool) -> bool {
    !note_is_new && old_md != new_md
}

/// Render the new content and decide on a snapshot. `previous_md` is the
/// stored content read just before the save, `None` for a new note or one
/// that could not be read.
#[must_use]
pub fn plan_save(previous_md: Option<&str>, new_md: &str) -> SavePlan {
    let snapshot = match previous_md {
        Some(old) if should_snapshot(old, new_md, false) => Some(old.to_string()),
        _ => None,
    };

    SavePlan {
        content_html: render_to_safe_html(new_md),
        snapshot,
    }
}

/// Split a comma-separated tag string. Names are trimmed; blanks and
/// repeats are dropped; order of first appearance is kept.
pub fn parse_tags(raw: &str) -> AppResult<Vec<String>> {
    let mut tags: Vec<String> = Vec::new();

    for name in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if name.chars().count() > TAG_MAX_LEN {
            return Err(AppError::Validation(format!(
                "tags: Tag is longer than {TAG_MAX_LEN} characters"
            )));
        }
        if !tags.iter().any(|t| t == name) {
            tags.push(name.to_string());
        }
    }

    Ok(tags)
}

fn active_string(value: &ActiveValue<String>) -> Option<&str> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v.as_str()),
        ActiveValue::NotSet => None,
    }
}

impl NoteService {
    /// Create a new note service.
    #[must_use]
    pub const fn new(note_repo: NoteRepository) -> Self {
        Self {
            note_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Run the save pipeline and persist the note.
    ///
    /// For an existing note the stored row is re-read to get the content
    /// being replaced. If it is gone the snapshot is skipped and the write
    /// goes ahead (and then reports the note as not found).
    pub async fn save(&self, mut note: note::ActiveModel, is_new: bool) -> AppResult<note::Model> {
        let new_md = active_string(&note.content_md).unwrap_or_default().to_string();
        let note_id = active_string(&note.id).unwrap_or_default().to_string();

        let previous = if is_new {
            None
        } else {
            let found = self.note_repo.find_by_id(&note_id).await?;
            if found.is_none() {
                debug!(note_id = %note_id, "Note vanished before save, skipping snapshot");
            }
            found
        };

        let plan = plan_save(previous.as_ref().map(|p| p.content_md.as_str()), &new_md);

        if let Some(old_md) = plan.snapshot {
            let version = note_version::ActiveModel {
                id: Set(self.id_gen.generate()),
                note_id: Set(note_id.clone()),
                content_md: Set(old_md),
                created_at: Set(Utc::now().into()),
            };
            self.note_repo.create_version(version).await?;
            debug!(note_id = %note_id, "Recorded note version");
        }

        let now = Utc::now();
        note.content_md = Set(new_md);
        note.content_html = Set(plan.content_html);
        note.updated_at = Set(now.into());

        if is_new {
            if note.created_at.is_not_set() {
                note.created_at = Set(now.into());
            }
            self.note_repo.create(note).await
        } else {
            self.note_repo.update(note).await
        }
    }

    /// Create a note.
    pub async fn create(&self, user_id: &str, input: CreateNoteInput) -> AppResult<NoteWithTags> {
        input.validate()?;
        let tags = parse_tags(input.tags.as_deref().unwrap_or_default())?;

        let model = note::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(input.title),
            content_md: Set(input.content_md),
            is_public: Set(input.is_public),
            public_uuid: Set(self.id_gen.generate_public_uuid()),
            views: Set(0),
            is_favorite: Set(input.is_favorite),
            ..Default::default()
        };

        let note = self.save(model, true).await?;
        self.replace_tags(&note.id, &tags).await?;

        info!(note_id = %note.id, user_id = %user_id, "Created note");
        Ok(NoteWithTags { note, tags })
    }

    /// Edit an owned note.
    pub async fn update(
        &self,
        user_id: &str,
        note_id: &str,
        input: UpdateNoteInput,
    ) -> AppResult<NoteWithTags> {
        input.validate()?;
        let new_tags = input.tags.as_deref().map(parse_tags).transpose()?;

        let note = self.note_repo.get_owned(note_id, user_id).await?;

        let mut active: note::ActiveModel = note.into();
        active.title = Set(input.title);
        active.content_md = Set(input.content_md);
        active.is_public = Set(input.is_public);
        active.is_favorite = Set(input.is_favorite);

        let note = self.save(active, false).await?;

        let tags = match new_tags {
            Some(tags) => {
                self.replace_tags(&note.id, &tags).await?;
                tags
            }
            None => self.note_repo.find_tags(&note.id).await?,
        };

        info!(note_id = %note.id, "Updated note");
        Ok(NoteWithTags { note, tags })
    }

    /// Save only the given fields of an owned note through the full pipeline.
    pub async fn autosave(
        &self,
        user_id: &str,
        note_id: &str,
        input: AutosaveInput,
    ) -> AppResult<note::Model> {
        input.validate()?;

        let note = self.note_repo.get_owned(note_id, user_id).await?;

        let mut active: note::ActiveModel = note.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content_md) = input.content_md {
            active.content_md = Set(content_md);
        }

        self.save(active, false).await
    }

    /// Owner read: counts a view and includes recent versions.
    pub async fn get_detail(&self, user_id: &str, note_id: &str) -> AppResult<NoteDetail> {
        let note = self.note_repo.get_owned(note_id, user_id).await?;
        let note = self.increment_views(note).await?;

        let tags = self.note_repo.find_tags(&note.id).await?;
        let recent_versions = self
            .note_repo
            .find_versions(&note.id, Some(RECENT_VERSIONS))
            .await?;

        Ok(NoteDetail {
            note,
            tags,
            recent_versions,
        })
    }

    /// Add one to the view counter.
    ///
    /// Read-modify-write on the value already loaded; only `views` is
    /// written. Concurrent readers can lose increments.
    pub async fn increment_views(&self, note: note::Model) -> AppResult<note::Model> {
        let views = note.views.saturating_add(1);
        let mut active: note::ActiveModel = note.into();
        active.views = Set(views);
        self.note_repo.update(active).await
    }

    /// Flip the favorite flag. Returns the new value.
    pub async fn toggle_favorite(&self, user_id: &str, note_id: &str) -> AppResult<bool> {
        let note = self.note_repo.get_owned(note_id, user_id).await?;
        let is_favorite = !note.is_favorite;

        let mut active: note::ActiveModel = note.into();
        active.is_favorite = Set(is_favorite);
        self.note_repo.update(active).await?;

        Ok(is_favorite)
    }

    /// Delete an owned note with its versions and tags.
    pub async fn delete(&self, user_id: &str, note_id: &str) -> AppResult<()> {
        let note = self.note_repo.get_owned(note_id, user_id).await?;
        self.note_repo.delete(&note.id).await?;

        info!(note_id = %note_id, user_id = %user_id, "Deleted note");
        Ok(())
    }

    /// Full version history of an owned note, newest first.
    pub async fn versions(
        &self,
        user_id: &str,
        note_id: &str,
    ) -> AppResult<Vec<note_version::Model>> {
        let note = self.note_repo.get_owned(note_id, user_id).await?;
        self.note_repo.find_versions(&note.id, None).await
    }

    /// Public read by share identifier. Counts a view like an owner read.
    pub async fn get_shared(&self, public_uuid: &str) -> AppResult<NoteWithTags> {
        let note = self
            .note_repo
            .find_public_by_uuid(public_uuid)
            .await?
            .ok_or_else(|| AppError::NoteNotFound(public_uuid.to_string()))?;

        let note = self.increment_views(note).await?;
        let tags = self.note_repo.find_tags(&note.id).await?;

        Ok(NoteWithTags { note, tags })
    }

    /// Get an owned note without counting a view.
    pub async fn get_owned(&self, user_id: &str, note_id: &str) -> AppResult<note::Model> {
        self.note_repo.get_owned(note_id, user_id).await
    }

    /// Filtered, sorted, paginated listing of the owner's notes.
    pub async fn list(&self, user_id: &str, query: &ListQuery) -> AppResult<NoteListPage> {
        let sort = query.sort_key();
        let filter = NoteFilter {
            search: query.search.clone(),
            tag: query.tag.clone(),
            favorites_only: query.favorites_only(),
        };

        let page = self
            .note_repo
            .list(
                user_id,
                &filter,
                sort.column(),
                sort.order(),
                query.page(),
                PAGE_SIZE,
            )
            .await?;

        let ids: Vec<String> = page.notes.iter().map(|n| n.id.clone()).collect();
        let mut tags_by_note = self.note_repo.find_tags_for_notes(&ids).await?;

        let notes = page
            .notes
            .into_iter()
            .map(|note| {
                let tags = tags_by_note.remove(&note.id).unwrap_or_default();
                NoteWithTags { note, tags }
            })
            .collect();

        Ok(NoteListPage {
            notes,
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            sort,
            all_tags: self.note_repo.find_distinct_tags(user_id).await?,
        })
    }

    /// Distinct tags across the owner's notes, sorted.
    pub async fn tags(&self, user_id: &str) -> AppResult<Vec<String>> {
        self.note_repo.find_distinct_tags(user_id).await
    }

    async fn replace_tags(&self, note_id: &str, tags: &[String]) -> AppResult<()> {
        let models = tags
            .iter()
            .map(|name| note_tag::ActiveModel {
                id: Set(self.id_gen.generate()),
                note_id: Set(note_id.to_string()),
                name: Set(name.clone()),
            })
            .collect();

        self.note_repo.replace_tags(note_id, models).await
    }
}
