//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use notebook_common::AppResult;
use notebook_core::{ActivateInput, SigninInput, SignupInput};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Signup response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub id: String,
    pub username: String,
    pub token: String,
    pub is_active: bool,
}

/// Create a new account. The activation code goes out of band.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupInput>,
) -> AppResult<ApiResponse<SignupResponse>> {
    let signup = state.user_service.signup(req).await?;
    let user = signup.user;

    Ok(ApiResponse::ok(SignupResponse {
        id: user.id,
        username: user.username,
        token: user.token.unwrap_or_default(),
        is_active: user.is_active,
    }))
}

/// Signin response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninInput>,
) -> AppResult<ApiResponse<SigninResponse>> {
    let user = state.user_service.signin(req).await?;

    Ok(ApiResponse::ok(SigninResponse {
        id: user.id,
        username: user.username,
        token: user.token.unwrap_or_default(),
    }))
}

/// Plain acknowledgement.
#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Sign out by rotating the token.
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.user_service.signout(&user.id).await?;

    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

/// Activation outcome.
#[derive(Serialize)]
pub struct ActivateResponse {
    pub valid: bool,
    pub reason: &'static str,
}

/// Redeem an activation code.
///
/// An expired or already used code is not an error: the response reports
/// `valid: false` with the reason.
async fn activate(
    State(state): State<AppState>,
    Json(req): Json<ActivateInput>,
) -> AppResult<ApiResponse<ActivateResponse>> {
    let validity = state.user_service.activate(req).await?;

    Ok(ApiResponse::ok(ActivateResponse {
        valid: validity.is_valid(),
        reason: validity.reason(),
    }))
}

/// Issue a fresh activation code.
async fn resend_activation(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<OkResponse>> {
    state.user_service.resend_activation(&user.id).await?;

    Ok(ApiResponse::ok(OkResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/activate", post(activate))
        .route("/resend-activation", post(resend_activation))
}
