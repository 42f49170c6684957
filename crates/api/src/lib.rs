//! HTTP API layer for notebook.
//!
//! - **Endpoints**: accounts, notes, public shares
//! - **Extractors**: authenticated user
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

use axum::{Router, middleware::from_fn_with_state};

/// The API router under `/api`, with authentication applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
