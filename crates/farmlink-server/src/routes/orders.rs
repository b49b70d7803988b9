//! Order Routes - Checkout and the order workflow
//!
//! Status changes go through one endpoint per acting role; the same account
//! may act as consumer on its purchases and as farmer on its sales.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use farmlink::{Actor, Role};

use crate::application::Checkout;
use crate::auth::CurrentActor;
use crate::models::{ChangeOrderStatusRequest, CreateOrderRequest, OrderListParams, OrderResponse};
use crate::AppState;

use super::{api_error, ApiError};

/// Place an order for selected cart items of one farmer
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Empty selection, inactive farmer, mixed farmers or cart item of another account"),
        (status = 403, description = "Address of another account"),
        (status = 409, description = "Out of stock, or stock or cart changed during checkout")
    ),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let checkout = Checkout {
        address_id: payload.address_id,
        farmer_id: payload.farmer_id,
        cart_item_ids: payload.items,
        payment_method: payload.payment_method,
        note: payload.note,
    };
    let order = state
        .order_service
        .create(&actor, checkout)
        .await
        .map_err(api_error)?;
    Ok(Json(order.into()))
}

/// Own purchases, newest first
#[utoipa::path(
    get,
    path = "/api/orders",
    responses((status = 200, description = "Orders", body = Vec<OrderResponse>)),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn list_my_orders(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.order_service.list_mine(&actor).await.map_err(api_error)?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Orders placed with the caller's farm (FARMER)
#[utoipa::path(
    get,
    path = "/api/orders/farmer",
    responses((status = 200, description = "Orders", body = Vec<OrderResponse>)),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn list_farmer_orders(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state
        .order_service
        .list_for_farmer(&actor)
        .await
        .map_err(api_error)?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Every order, optionally by status (ADMIN)
#[utoipa::path(
    get,
    path = "/api/orders/all",
    params(OrderListParams),
    responses((status = 200, description = "Orders", body = Vec<OrderResponse>)),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<OrderListParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state
        .order_service
        .list_all(&actor, params.status)
        .await
        .map_err(api_error)?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Order detail for its buyer, its farmer or an admin
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 403, description = "Not a party to the order"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.order_service.get(&actor, id).await.map_err(api_error)?;
    Ok(Json(order.into()))
}

async fn change_status_as(
    state: &AppState,
    actor: &Actor,
    role: Role,
    payload: ChangeOrderStatusRequest,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .order_service
        .change_status(actor, role, payload.order_id, payload.status, payload.reason)
        .await
        .map_err(api_error)?;
    Ok(Json(order.into()))
}

/// Cancel or confirm receipt as the buyer
#[utoipa::path(
    post,
    path = "/api/orders/consumer/change-status",
    request_body = ChangeOrderStatusRequest,
    responses(
        (status = 200, description = "Order with new status", body = OrderResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 409, description = "Order changed concurrently")
    ),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn consumer_change_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<ChangeOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    change_status_as(&state, &actor, Role::Consumer, payload).await
}

/// Advance fulfilment as the selling farmer
#[utoipa::path(
    post,
    path = "/api/orders/farmer/change-status",
    request_body = ChangeOrderStatusRequest,
    responses(
        (status = 200, description = "Order with new status", body = OrderResponse),
        (status = 400, description = "Transition not allowed")
    ),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn farmer_change_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<ChangeOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    change_status_as(&state, &actor, Role::Farmer, payload).await
}

/// Override status as an admin
#[utoipa::path(
    post,
    path = "/api/orders/admin/change-status",
    request_body = ChangeOrderStatusRequest,
    responses(
        (status = 200, description = "Order with new status", body = OrderResponse),
        (status = 400, description = "Transition not allowed")
    ),
    security(("bearer" = [])),
    tag = "Orders"
)]
pub async fn admin_change_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<ChangeOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    change_status_as(&state, &actor, Role::Admin, payload).await
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_my_orders).post(create_order))
        .route("/api/orders/farmer", get(list_farmer_orders))
        .route("/api/orders/all", get(list_all_orders))
        .route("/api/orders/:id", get(get_order))
        .route("/api/orders/consumer/change-status", post(consumer_change_status))
        .route("/api/orders/farmer/change-status", post(farmer_change_status))
        .route("/api/orders/admin/change-status", post(admin_change_status))
}
