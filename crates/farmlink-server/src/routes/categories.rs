//! Category Routes - Category tree; writes are ADMIN only

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::models::{CategoryNodeResponse, CategoryRequest, CategoryResponse, MessageResponse};
use crate::AppState;

use super::{api_error, ApiError};

/// Whole category tree, roots first
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Category forest", body = Vec<CategoryNodeResponse>)),
    tag = "Categories"
)]
pub async fn get_tree(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryNodeResponse>>, ApiError> {
    let tree = state.category_service.tree().await.map_err(api_error)?;
    Ok(Json(tree.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category created", body = CategoryResponse),
        (status = 404, description = "Parent not found")
    ),
    security(("bearer" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .category_service
        .create(&actor, &payload.name, payload.parent_id)
        .await
        .map_err(api_error)?;
    Ok(Json(category.into()))
}

/// Rename or move a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 400, description = "Move would create a cycle")
    ),
    security(("bearer" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .category_service
        .update(&actor, id, &payload.name, payload.parent_id)
        .await
        .map_err(api_error)?;
    Ok(Json(category.into()))
}

/// Delete a category with its subtree
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 409, description = "Products still reference the subtree")
    ),
    security(("bearer" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .category_service
        .delete(&actor, id)
        .await
        .map_err(api_error)?;
    Ok(Json(MessageResponse::new("Category deleted")))
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/api/categories", get(get_tree))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", post(create_category))
        .route("/api/categories/:id", put(update_category).delete(delete_category))
}
