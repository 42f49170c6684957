//! API endpoints.

mod account;
mod auth;
mod notes;
mod share;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/notes", notes::router())
        .nest("/share", share::router())
        .nest("/account", account::router())
}
