//! Auth Routes - Registration, login and token rotation

use axum::{extract::State, routing::post, Json, Router};

use crate::models::{LoginRequest, MessageResponse, RefreshRequest, RegisterRequest, TokenResponse};
use crate::AppState;

use super::{api_error, ApiError};

/// Register a consumer account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created and signed in", body = TokenResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let pair = state
        .auth_service
        .register(&payload.email, &payload.password, payload.display_name)
        .await
        .map_err(api_error)?;
    Ok(Json(pair.into()))
}

/// Sign in with a role the account holds
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 400, description = "Wrong password"),
        (status = 403, description = "Account lacks the requested role"),
        (status = 404, description = "Unknown email")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let pair = state
        .auth_service
        .login(&payload.email, &payload.password, payload.role)
        .await
        .map_err(api_error)?;
    Ok(Json(pair.into()))
}

/// Rotate the refresh token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New token pair", body = TokenResponse),
        (status = 401, description = "Refresh token invalid or revoked")
    ),
    tag = "Auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let pair = state
        .auth_service
        .refresh(&payload.refresh_token)
        .await
        .map_err(api_error)?;
    Ok(Json(pair.into()))
}

/// Revoke the refresh token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Refresh token invalid or revoked")
    ),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service
        .logout(&payload.refresh_token)
        .await
        .map_err(api_error)?;
    Ok(Json(MessageResponse::new("Signed out")))
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
}
