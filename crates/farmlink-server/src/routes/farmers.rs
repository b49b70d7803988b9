//! Farmer Routes - Farmer profiles, moderation and farm address

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::application::FarmerUpdate;
use crate::auth::CurrentActor;
use crate::models::{
    FarmerResponse, FarmerStatusRequest, PostalAddressDto, ProductResponse, UpdateFarmerRequest,
    UpgradeFarmerRequest, UpgradeFarmerResponse,
};
use crate::AppState;

use super::{api_error, ApiError};

/// Become a farmer; returns tokens carrying the FARMER role
#[utoipa::path(
    post,
    path = "/api/farmers/upgrade",
    request_body = UpgradeFarmerRequest,
    responses(
        (status = 200, description = "Farmer profile created", body = UpgradeFarmerResponse),
        (status = 409, description = "Already a farmer")
    ),
    security(("bearer" = [])),
    tag = "Farmers"
)]
pub async fn upgrade(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<UpgradeFarmerRequest>,
) -> Result<Json<UpgradeFarmerResponse>, ApiError> {
    let farmer = state
        .farmer_service
        .upgrade_to_farmer(&actor, &payload.name)
        .await
        .map_err(api_error)?;
    let tokens = state
        .auth_service
        .reissue(actor.account_id)
        .await
        .map_err(api_error)?;

    Ok(Json(UpgradeFarmerResponse {
        farmer: farmer.into(),
        tokens: tokens.into(),
    }))
}

/// Public farmer profile
#[utoipa::path(
    get,
    path = "/api/farmers/{id}",
    params(("id" = Uuid, Path, description = "Farmer ID")),
    responses(
        (status = 200, description = "Farmer", body = FarmerResponse),
        (status = 404, description = "Farmer not found")
    ),
    tag = "Farmers"
)]
pub async fn get_farmer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FarmerResponse>, ApiError> {
    let farmer = state.farmer_service.get(id).await.map_err(api_error)?;
    Ok(Json(farmer.into()))
}

/// Active products of one farmer
#[utoipa::path(
    get,
    path = "/api/farmers/{id}/products",
    params(("id" = Uuid, Path, description = "Farmer ID")),
    responses((status = 200, description = "Products", body = Vec<ProductResponse>)),
    tag = "Farmers"
)]
pub async fn list_farmer_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state
        .product_service
        .list_by_farmer(id)
        .await
        .map_err(api_error)?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/farmers/me",
    responses(
        (status = 200, description = "Own farmer profile", body = FarmerResponse),
        (status = 403, description = "FARMER role required")
    ),
    security(("bearer" = [])),
    tag = "Farmers"
)]
pub async fn get_my_farmer(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<FarmerResponse>, ApiError> {
    let farmer = state.farmer_service.get_mine(&actor).await.map_err(api_error)?;
    Ok(Json(farmer.into()))
}

#[utoipa::path(
    patch,
    path = "/api/farmers/me",
    request_body = UpdateFarmerRequest,
    responses((status = 200, description = "Updated profile", body = FarmerResponse)),
    security(("bearer" = [])),
    tag = "Farmers"
)]
pub async fn update_my_farmer(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<UpdateFarmerRequest>,
) -> Result<Json<FarmerResponse>, ApiError> {
    let farmer = state
        .farmer_service
        .update_info(
            &actor,
            FarmerUpdate {
                name: payload.name,
                avatar: payload.avatar,
                cover_image: payload.cover_image,
                description: payload.description,
            },
        )
        .await
        .map_err(api_error)?;
    Ok(Json(farmer.into()))
}

/// List all farmers (ADMIN)
#[utoipa::path(
    get,
    path = "/api/farmers",
    responses((status = 200, description = "Farmers", body = Vec<FarmerResponse>)),
    security(("bearer" = [])),
    tag = "Farmers"
)]
pub async fn list_farmers(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<FarmerResponse>>, ApiError> {
    let farmers = state.farmer_service.list_all(&actor).await.map_err(api_error)?;
    Ok(Json(farmers.into_iter().map(Into::into).collect()))
}

/// Approve, block or reactivate a farmer (ADMIN)
#[utoipa::path(
    put,
    path = "/api/farmers/{id}/status",
    params(("id" = Uuid, Path, description = "Farmer ID")),
    request_body = FarmerStatusRequest,
    responses(
        (status = 200, description = "Farmer with new status", body = FarmerResponse),
        (status = 400, description = "Transition not allowed")
    ),
    security(("bearer" = [])),
    tag = "Farmers"
)]
pub async fn change_farmer_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<FarmerStatusRequest>,
) -> Result<Json<FarmerResponse>, ApiError> {
    let farmer = state
        .farmer_service
        .change_status(&actor, id, payload.status)
        .await
        .map_err(api_error)?;
    Ok(Json(farmer.into()))
}

#[utoipa::path(
    post,
    path = "/api/farmers/me/address",
    request_body = PostalAddressDto,
    responses(
        (status = 200, description = "Farm address set", body = FarmerResponse),
        (status = 409, description = "Farm address already set")
    ),
    security(("bearer" = [])),
    tag = "Farmers"
)]
pub async fn create_farm_address(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<PostalAddressDto>,
) -> Result<Json<FarmerResponse>, ApiError> {
    let farmer = state
        .farmer_service
        .create_address(&actor, payload.into())
        .await
        .map_err(api_error)?;
    Ok(Json(farmer.into()))
}

#[utoipa::path(
    put,
    path = "/api/farmers/me/address",
    request_body = PostalAddressDto,
    responses(
        (status = 200, description = "Farm address replaced", body = FarmerResponse),
        (status = 404, description = "No farm address yet")
    ),
    security(("bearer" = [])),
    tag = "Farmers"
)]
pub async fn update_farm_address(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<PostalAddressDto>,
) -> Result<Json<FarmerResponse>, ApiError> {
    let farmer = state
        .farmer_service
        .update_address(&actor, payload.into())
        .await
        .map_err(api_error)?;
    Ok(Json(farmer.into()))
}

#[utoipa::path(
    delete,
    path = "/api/farmers/me/address",
    responses((status = 200, description = "Farm address removed", body = FarmerResponse)),
    security(("bearer" = [])),
    tag = "Farmers"
)]
pub async fn delete_farm_address(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<FarmerResponse>, ApiError> {
    let farmer = state
        .farmer_service
        .delete_address(&actor)
        .await
        .map_err(api_error)?;
    Ok(Json(farmer.into()))
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/farmers/:id", get(get_farmer))
        .route("/api/farmers/:id/products", get(list_farmer_products))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/farmers", get(list_farmers))
        .route("/api/farmers/upgrade", post(upgrade))
        .route("/api/farmers/me", get(get_my_farmer).patch(update_my_farmer))
        .route(
            "/api/farmers/me/address",
            post(create_farm_address)
                .put(update_farm_address)
                .delete(delete_farm_address),
        )
        .route("/api/farmers/:id/status", put(change_farmer_status))
}
