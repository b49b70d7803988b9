//! Market Price Routes - Regional prices observed for products

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::application::MarketPricePatch;
use crate::auth::CurrentActor;
use crate::models::{
    CreateMarketPriceRequest, MarketPriceParams, MarketPriceResponse, MessageResponse,
    UpdateMarketPriceRequest,
};
use crate::AppState;

use super::{api_error, ApiError};

/// Market prices, newest first, optionally for one product
#[utoipa::path(
    get,
    path = "/api/market-prices",
    params(MarketPriceParams),
    responses((status = 200, description = "Market prices", body = Vec<MarketPriceResponse>)),
    tag = "MarketPrices"
)]
pub async fn list_market_prices(
    State(state): State<AppState>,
    Query(params): Query<MarketPriceParams>,
) -> Result<Json<Vec<MarketPriceResponse>>, ApiError> {
    let prices = state
        .market_price_service
        .list(params.product_id)
        .await
        .map_err(api_error)?;
    Ok(Json(prices.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/market-prices/{id}",
    params(("id" = Uuid, Path, description = "Market price ID")),
    responses(
        (status = 200, description = "Market price", body = MarketPriceResponse),
        (status = 404, description = "Market price not found")
    ),
    tag = "MarketPrices"
)]
pub async fn get_market_price(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MarketPriceResponse>, ApiError> {
    let price = state.market_price_service.get(id).await.map_err(api_error)?;
    Ok(Json(price.into()))
}

/// Record a market price (ADMIN)
#[utoipa::path(
    post,
    path = "/api/market-prices",
    request_body = CreateMarketPriceRequest,
    responses(
        (status = 200, description = "Recorded", body = MarketPriceResponse),
        (status = 400, description = "Negative price or blank region")
    ),
    security(("bearer" = [])),
    tag = "MarketPrices"
)]
pub async fn create_market_price(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<CreateMarketPriceRequest>,
) -> Result<Json<MarketPriceResponse>, ApiError> {
    let price = state
        .market_price_service
        .create(
            &actor,
            payload.product_id,
            payload.price,
            &payload.region,
            payload.date_recorded,
        )
        .await
        .map_err(api_error)?;
    Ok(Json(price.into()))
}

/// Partial update (ADMIN)
#[utoipa::path(
    patch,
    path = "/api/market-prices/{id}",
    params(("id" = Uuid, Path, description = "Market price ID")),
    request_body = UpdateMarketPriceRequest,
    responses((status = 200, description = "Updated", body = MarketPriceResponse)),
    security(("bearer" = [])),
    tag = "MarketPrices"
)]
pub async fn update_market_price(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMarketPriceRequest>,
) -> Result<Json<MarketPriceResponse>, ApiError> {
    let patch = MarketPricePatch {
        product_id: payload.product_id,
        price: payload.price,
        region: payload.region,
        date_recorded: payload.date_recorded,
    };
    let price = state
        .market_price_service
        .patch(&actor, id, patch)
        .await
        .map_err(api_error)?;
    Ok(Json(price.into()))
}

#[utoipa::path(
    delete,
    path = "/api/market-prices/{id}",
    params(("id" = Uuid, Path, description = "Market price ID")),
    responses((status = 200, description = "Deleted", body = MessageResponse)),
    security(("bearer" = [])),
    tag = "MarketPrices"
)]
pub async fn delete_market_price(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .market_price_service
        .delete(&actor, id)
        .await
        .map_err(api_error)?;
    Ok(Json(MessageResponse::new("Market price deleted")))
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/market-prices", get(list_market_prices))
        .route("/api/market-prices/:id", get(get_market_price))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/market-prices", post(create_market_price))
        .route(
            "/api/market-prices/:id",
            patch(update_market_price).delete(delete_market_price),
        )
}
