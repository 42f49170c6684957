//! Account endpoints.

use axum::{Router, extract::State, routing::get};
use notebook_common::AppResult;
use notebook_core::ProfileStats;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Note statistics for the signed-in user.
async fn stats(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileStats>> {
    let stats = state.user_service.stats(&user.id).await?;
    Ok(ApiResponse::ok(stats))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}
