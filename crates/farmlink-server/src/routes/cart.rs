//! Cart Routes - The caller's shopping cart

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::models::{
    AddToCartRequest, CartItemResponse, CartLineResponse, ClearCartResponse, MessageResponse,
    UpdateCartItemRequest,
};
use crate::AppState;

use super::{api_error, ApiError};

/// Cart lines with their products
#[utoipa::path(
    get,
    path = "/api/cart",
    responses((status = 200, description = "Cart", body = Vec<CartLineResponse>)),
    security(("bearer" = [])),
    tag = "Cart"
)]
pub async fn list_cart(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<CartLineResponse>>, ApiError> {
    let lines = state.cart_service.list(&actor).await.map_err(api_error)?;
    Ok(Json(lines.into_iter().map(Into::into).collect()))
}

/// Add a product; merges into an existing line
#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Cart item", body = CartItemResponse),
        (status = 400, description = "Quantity out of range or above stock"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Json<CartItemResponse>, ApiError> {
    let item = state
        .cart_service
        .add(&actor, payload.product_id, payload.quantity)
        .await
        .map_err(api_error)?;
    Ok(Json(item.into()))
}

#[utoipa::path(
    put,
    path = "/api/cart/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    request_body = UpdateCartItemRequest,
    responses((status = 200, description = "Cart item", body = CartItemResponse)),
    security(("bearer" = [])),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<Json<CartItemResponse>, ApiError> {
    let item = state
        .cart_service
        .update_quantity(&actor, id, payload.quantity)
        .await
        .map_err(api_error)?;
    Ok(Json(item.into()))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{id}",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses((status = 200, description = "Removed", body = MessageResponse)),
    security(("bearer" = [])),
    tag = "Cart"
)]
pub async fn remove_cart_item(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .cart_service
        .remove(&actor, id)
        .await
        .map_err(api_error)?;
    Ok(Json(MessageResponse::new("Cart item removed")))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    responses((status = 200, description = "Cart emptied", body = ClearCartResponse)),
    security(("bearer" = [])),
    tag = "Cart"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ClearCartResponse>, ApiError> {
    let removed = state.cart_service.clear(&actor).await.map_err(api_error)?;
    Ok(Json(ClearCartResponse { removed }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/cart",
            get(list_cart).post(add_to_cart).delete(clear_cart),
        )
        .route("/api/cart/:id", put(update_cart_item).delete(remove_cart_item))
}
