//! Note endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, post},
};
use notebook_common::{AppError, AppResult, config::ServerConfig};
use notebook_core::{
    AutosaveInput, CreateNoteInput, ListQuery, NoteDetail, NoteWithTags, PAGE_SIZE,
    UpdateNoteInput,
};
use notebook_db::entities::{note, note_version};
use serde::Serialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Download},
};

/// Note as seen by its owner.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: String,
    pub title: String,
    pub content_md: String,
    pub content_html: String,
    pub is_public: bool,
    pub public_uuid: String,
    pub share_url: Option<String>,
    pub views: i32,
    pub is_favorite: bool,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteResponse {
    fn new(note: note::Model, tags: Vec<String>, server: &ServerConfig) -> Self {
        let share_url = note
            .is_public
            .then(|| server.share_url(&note.public_uuid));

        Self {
            id: note.id,
            title: note.title,
            content_md: note.content_md,
            content_html: note.content_html,
            is_public: note.is_public,
            public_uuid: note.public_uuid,
            share_url,
            views: note.views,
            is_favorite: note.is_favorite,
            tags,
            created_at: note.created_at.to_rfc3339(),
            updated_at: note.updated_at.to_rfc3339(),
        }
    }

    fn from_tagged(tagged: NoteWithTags, server: &ServerConfig) -> Self {
        Self::new(tagged.note, tagged.tags, server)
    }
}

/// A stored snapshot of earlier content.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub id: String,
    pub content_md: String,
    pub created_at: String,
}

impl From<note_version::Model> for VersionResponse {
    fn from(version: note_version::Model) -> Self {
        Self {
            id: version.id,
            content_md: version.content_md,
            created_at: version.created_at.to_rfc3339(),
        }
    }
}

/// Owner's detail view.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDetailResponse {
    #[serde(flatten)]
    pub note: NoteResponse,
    pub recent_versions: Vec<VersionResponse>,
}

/// One listing page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteListResponse {
    pub notes: Vec<NoteResponse>,
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub page_size: u64,
    pub sort: String,
    /// Every tag in use, for the filter menu.
    pub tags: Vec<String>,
}

/// List the caller's notes.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<NoteListResponse>> {
    let page = state.note_service.list(&user.id, &query).await?;

    Ok(ApiResponse::ok(NoteListResponse {
        notes: page
            .notes
            .into_iter()
            .map(|n| NoteResponse::from_tagged(n, &state.server))
            .collect(),
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
        page_size: PAGE_SIZE,
        sort: page.sort.to_string(),
        tags: page.all_tags,
    }))
}

/// Create a note.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateNoteInput>,
) -> AppResult<ApiResponse<NoteResponse>> {
    let note = state.note_service.create(&user.id, req).await?;
    Ok(ApiResponse::ok(NoteResponse::from_tagged(note, &state.server)))
}

/// Distinct tags across the caller's notes.
async fn tags(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let tags = state.note_service.tags(&user.id).await?;
    Ok(ApiResponse::ok(tags))
}

/// Show a note. Counts a view.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<NoteDetailResponse>> {
    let NoteDetail {
        note,
        tags,
        recent_versions,
    } = state.note_service.get_detail(&user.id, &id).await?;

    Ok(ApiResponse::ok(NoteDetailResponse {
        note: NoteResponse::new(note, tags, &state.server),
        recent_versions: recent_versions.into_iter().map(Into::into).collect(),
    }))
}

/// Edit a note.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNoteInput>,
) -> AppResult<ApiResponse<NoteResponse>> {
    let note = state.note_service.update(&user.id, &id, req).await?;
    Ok(ApiResponse::ok(NoteResponse::from_tagged(note, &state.server)))
}

/// Deletion acknowledgement.
#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// Delete a note with its history.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeletedResponse>> {
    state.note_service.delete(&user.id, &id).await?;
    Ok(ApiResponse::ok(DeletedResponse { deleted: true }))
}

/// Full version history, newest first.
async fn versions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<VersionResponse>>> {
    let versions = state.note_service.versions(&user.id, &id).await?;
    Ok(ApiResponse::ok(versions.into_iter().map(Into::into).collect()))
}

/// New favorite state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub is_favorite: bool,
}

/// Flip the favorite flag.
async fn toggle_favorite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<FavoriteResponse>> {
    let is_favorite = state.note_service.toggle_favorite(&user.id, &id).await?;
    Ok(ApiResponse::ok(FavoriteResponse { is_favorite }))
}

/// Autosave result.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveResponse {
    pub updated_at: String,
}

/// Save a partial edit from the editor.
///
/// The body is parsed by hand so malformed JSON reports as a validation
/// failure instead of axum's own rejection.
async fn autosave(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<ApiResponse<AutosaveResponse>> {
    let input: AutosaveInput = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("invalid autosave body: {e}")))?;

    let note = state.note_service.autosave(&user.id, &id, input).await?;

    Ok(ApiResponse::ok(AutosaveResponse {
        updated_at: note.updated_at.to_rfc3339(),
    }))
}

/// Download the raw Markdown.
async fn export_markdown(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Download> {
    let file = state.export_service.markdown(&user.id, &id).await?;
    Ok(Download(file))
}

/// Download a PDF rendering.
async fn export_pdf(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Download> {
    let file = state.export_service.pdf(&user.id, &id).await?;
    Ok(Download(file))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/tags", get(tags))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/versions", get(versions))
        .route("/{id}/favorite", post(toggle_favorite))
        .route("/{id}/autosave", post(autosave))
        .route("/{id}/export/markdown", get(export_markdown))
        .route("/{id}/export/pdf", get(export_pdf))
}
