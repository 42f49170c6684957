//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use notebook_common::config::ServerConfig;
use notebook_core::{ActivationCodeService, ExportService, NoteService, UserService};
use notebook_db::repositories::{ActivationCodeRepository, NoteRepository, UserRepository};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::debug;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub note_service: NoteService,
    pub export_service: ExportService,
    pub server: ServerConfig,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, server: ServerConfig) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let note_repo = NoteRepository::new(Arc::clone(&db));
        let code_repo = ActivationCodeRepository::new(db);

        let activation = ActivationCodeService::new(code_repo);

        Self {
            user_service: UserService::new(user_repo, note_repo.clone(), activation),
            note_service: NoteService::new(note_repo.clone()),
            export_service: ExportService::new(note_repo),
            server,
        }
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to a user and stores it in the
/// request extensions. Requests without a valid token pass through
/// unauthenticated; handlers that need a user reject them.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token.trim()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => debug!(error = %e, "Bearer token rejected"),
        }
    }

    next.run(req).await
}
