//! Address Routes - Saved delivery addresses of the caller

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::CurrentActor;
use crate::models::{AddressRequest, AddressResponse, MessageResponse};
use crate::AppState;

use super::{api_error, ApiError};

/// Create an address; the first one becomes the default
#[utoipa::path(
    post,
    path = "/api/addresses",
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Address created", body = AddressResponse),
        (status = 400, description = "Missing field or invalid phone")
    ),
    security(("bearer" = [])),
    tag = "Addresses"
)]
pub async fn create_address(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<AddressRequest>,
) -> Result<Json<AddressResponse>, ApiError> {
    let address = state
        .address_service
        .create(&actor, payload.postal.into(), payload.is_default)
        .await
        .map_err(api_error)?;
    Ok(Json(address.into()))
}

/// List own addresses, default first
#[utoipa::path(
    get,
    path = "/api/addresses",
    responses((status = 200, description = "Addresses", body = Vec<AddressResponse>)),
    security(("bearer" = [])),
    tag = "Addresses"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<AddressResponse>>, ApiError> {
    let addresses = state.address_service.list(&actor).await.map_err(api_error)?;
    Ok(Json(addresses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address", body = AddressResponse),
        (status = 403, description = "Address of another account"),
        (status = 404, description = "Address not found")
    ),
    security(("bearer" = [])),
    tag = "Addresses"
)]
pub async fn get_address(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<AddressResponse>, ApiError> {
    let address = state.address_service.get(&actor, id).await.map_err(api_error)?;
    Ok(Json(address.into()))
}

#[utoipa::path(
    put,
    path = "/api/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Updated address", body = AddressResponse),
        (status = 404, description = "Address not found")
    ),
    security(("bearer" = [])),
    tag = "Addresses"
)]
pub async fn update_address(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddressRequest>,
) -> Result<Json<AddressResponse>, ApiError> {
    let address = state
        .address_service
        .update(&actor, id, payload.postal.into(), payload.is_default)
        .await
        .map_err(api_error)?;
    Ok(Json(address.into()))
}

/// Make an address the default
#[utoipa::path(
    post,
    path = "/api/addresses/{id}/default",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses((status = 200, description = "New default", body = AddressResponse)),
    security(("bearer" = [])),
    tag = "Addresses"
)]
pub async fn set_default_address(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<AddressResponse>, ApiError> {
    let address = state
        .address_service
        .set_default(&actor, id)
        .await
        .map_err(api_error)?;
    Ok(Json(address.into()))
}

/// Delete an address; another one is promoted when the default goes
#[utoipa::path(
    delete,
    path = "/api/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses((status = 200, description = "Deleted", body = MessageResponse)),
    security(("bearer" = [])),
    tag = "Addresses"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .address_service
        .delete(&actor, id)
        .await
        .map_err(api_error)?;
    Ok(Json(MessageResponse::new("Address deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/addresses", get(list_addresses).post(create_address))
        .route(
            "/api/addresses/:id",
            get(get_address).put(update_address).delete(delete_address),
        )
        .route("/api/addresses/:id/default", post(set_default_address))
}
