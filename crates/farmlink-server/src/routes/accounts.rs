//! Account Routes - Own profile, password, notification settings

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::application::ProfileUpdate;
use crate::auth::CurrentActor;
use crate::models::{
    AccountResponse, ChangePasswordRequest, MessageResponse, NotificationSettingsDto,
    UpdateProfileRequest,
};
use crate::AppState;

use super::{api_error, ApiError};

/// Current account
#[utoipa::path(
    get,
    path = "/api/accounts/me",
    responses(
        (status = 200, description = "Own account", body = AccountResponse),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn get_me(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.account_service.get_me(&actor).await.map_err(api_error)?;
    Ok(Json(account.into()))
}

/// Update display name, phone or avatar
#[utoipa::path(
    patch,
    path = "/api/accounts/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Invalid phone or blank name")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state
        .account_service
        .update_me(
            &actor,
            ProfileUpdate {
                display_name: payload.display_name,
                phone: payload.phone,
                avatar: payload.avatar,
            },
        )
        .await
        .map_err(api_error)?;
    Ok(Json(account.into()))
}

/// Change own password
#[utoipa::path(
    post,
    path = "/api/accounts/me/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Wrong current password or weak new password")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service
        .change_password(&actor, &payload.current_password, &payload.new_password)
        .await
        .map_err(api_error)?;
    Ok(Json(MessageResponse::new("Password changed")))
}

/// Notification preferences
#[utoipa::path(
    get,
    path = "/api/accounts/me/notification-settings",
    responses((status = 200, description = "Settings", body = NotificationSettingsDto)),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn get_notification_settings(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<NotificationSettingsDto>, ApiError> {
    let settings = state
        .account_service
        .notification_settings(&actor)
        .await
        .map_err(api_error)?;
    Ok(Json(settings.into()))
}

/// Replace notification preferences
#[utoipa::path(
    put,
    path = "/api/accounts/me/notification-settings",
    request_body = NotificationSettingsDto,
    responses((status = 200, description = "Stored settings", body = NotificationSettingsDto)),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn update_notification_settings(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<NotificationSettingsDto>,
) -> Result<Json<NotificationSettingsDto>, ApiError> {
    let settings = state
        .account_service
        .update_notification_settings(&actor, payload.into())
        .await
        .map_err(api_error)?;
    Ok(Json(settings.into()))
}

/// List all accounts (ADMIN)
#[utoipa::path(
    get,
    path = "/api/accounts",
    responses(
        (status = 200, description = "All accounts", body = Vec<AccountResponse>),
        (status = 403, description = "ADMIN role required")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = state.account_service.list_all(&actor).await.map_err(api_error)?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// Delete an account (ADMIN, not self)
#[utoipa::path(
    delete,
    path = "/api/accounts/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 400, description = "Cannot delete own account"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .account_service
        .delete(&actor, id)
        .await
        .map_err(api_error)?;
    Ok(Json(MessageResponse::new("Account deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/accounts", get(list_accounts))
        .route("/api/accounts/me", get(get_me).patch(update_me))
        .route("/api/accounts/me/password", post(change_password))
        .route(
            "/api/accounts/me/notification-settings",
            get(get_notification_settings).put(update_notification_settings),
        )
        .route("/api/accounts/:id", delete(delete_account))
}
