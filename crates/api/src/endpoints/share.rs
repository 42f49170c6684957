//! Public share links.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use notebook_common::AppResult;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// A shared note. Carries nothing about the owner.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedNoteResponse {
    pub title: String,
    pub content_html: String,
    pub tags: Vec<String>,
    pub views: i32,
    pub updated_at: String,
}

/// Read a public note. No authentication; counts a view.
async fn show(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> AppResult<ApiResponse<SharedNoteResponse>> {
    let shared = state.note_service.get_shared(&uuid).await?;
    let note = shared.note;

    Ok(ApiResponse::ok(SharedNoteResponse {
        title: note.title,
        content_html: note.content_html,
        tags: shared.tags,
        views: note.views,
        updated_at: note.updated_at.to_rfc3339(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{uuid}", get(show))
}
