//! Product Routes - Public catalogue and product management

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use farmlink::{PageRequest, ProductQuery};

use crate::auth::{CurrentActor, MaybeActor};
use crate::models::{
    MessageResponse, ProductListParams, ProductNameResponse, ProductPageResponse, ProductRequest,
    ProductResponse, ProductStatusRequest,
};
use crate::AppState;

use super::{api_error, ApiError};

/// Browse active products of active farmers
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Product page", body = ProductPageResponse),
        (status = 400, description = "min_price above max_price"),
        (status = 404, description = "Category not found")
    ),
    tag = "Products"
)]
pub async fn catalogue(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<ProductPageResponse>, ApiError> {
    let query = ProductQuery {
        category_id: params.category_id,
        keyword: params.keyword,
        min_price: params.min_price,
        max_price: params.max_price,
        sort: params.sort.unwrap_or_default(),
    };
    let page = state
        .product_service
        .catalogue(&query, PageRequest::new(params.page, params.size))
        .await
        .map_err(api_error)?;
    Ok(Json(page.into()))
}

/// Ids and names for search suggestions
#[utoipa::path(
    get,
    path = "/api/products/names",
    responses((status = 200, description = "Names", body = Vec<ProductNameResponse>)),
    tag = "Products"
)]
pub async fn product_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductNameResponse>>, ApiError> {
    let names = state.product_service.names().await.map_err(api_error)?;
    Ok(Json(names.into_iter().map(Into::into).collect()))
}

/// Product detail; hidden products only for their farmer and admins
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 403, description = "Product not visible"),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    MaybeActor(actor): MaybeActor,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .product_service
        .get(actor.as_ref(), id)
        .await
        .map_err(api_error)?;
    Ok(Json(product.into()))
}

/// List a new product (FARMER)
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid price, inventory or name"),
        (status = 403, description = "FARMER role required")
    ),
    security(("bearer" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .product_service
        .create(&actor, payload.into())
        .await
        .map_err(api_error)?;
    Ok(Json(product.into()))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ProductResponse),
        (status = 403, description = "Product of another farmer")
    ),
    security(("bearer" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .product_service
        .update(&actor, id, payload.into())
        .await
        .map_err(api_error)?;
    Ok(Json(product.into()))
}

/// Soft delete
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses((status = 200, description = "Deleted", body = MessageResponse)),
    security(("bearer" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .product_service
        .delete(&actor, id)
        .await
        .map_err(api_error)?;
    Ok(Json(MessageResponse::new("Product deleted")))
}

/// Own products in every status (FARMER)
#[utoipa::path(
    get,
    path = "/api/products/mine",
    responses((status = 200, description = "Products", body = Vec<ProductResponse>)),
    security(("bearer" = [])),
    tag = "Products"
)]
pub async fn list_my_products(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.product_service.list_mine(&actor).await.map_err(api_error)?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Every product, deleted ones included (ADMIN)
#[utoipa::path(
    get,
    path = "/api/products/all",
    responses((status = 200, description = "Products", body = Vec<ProductResponse>)),
    security(("bearer" = [])),
    tag = "Products"
)]
pub async fn list_all_products(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.product_service.list_all(&actor).await.map_err(api_error)?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Hide, reject or restore a product (ADMIN)
#[utoipa::path(
    put,
    path = "/api/products/{id}/status",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ProductStatusRequest,
    responses((status = 200, description = "Product with new status", body = ProductResponse)),
    security(("bearer" = [])),
    tag = "Products"
)]
pub async fn change_product_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductStatusRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .product_service
        .admin_change_status(&actor, id, payload.status)
        .await
        .map_err(api_error)?;
    Ok(Json(product.into()))
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(catalogue))
        .route("/api/products/names", get(product_names))
        .route("/api/products/:id", get(get_product))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", post(create_product))
        .route("/api/products/mine", get(list_my_products))
        .route("/api/products/all", get(list_all_products))
        .route("/api/products/:id", put(update_product).delete(delete_product))
        .route("/api/products/:id/status", put(change_product_status))
}
