//! OCOP Routes - Product certification and its review

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::{CurrentActor, MaybeActor};
use crate::models::{OcopListParams, OcopRejectRequest, OcopRequest, OcopResponse};
use crate::AppState;

use super::{api_error, ApiError};

/// Certification of a product; unverified ones only for its farmer and admins
#[utoipa::path(
    get,
    path = "/api/products/{id}/ocop",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Certification", body = OcopResponse),
        (status = 403, description = "Product not visible"),
        (status = 404, description = "Product or certification not found")
    ),
    tag = "Ocop"
)]
pub async fn get_ocop(
    State(state): State<AppState>,
    MaybeActor(actor): MaybeActor,
    Path(id): Path<Uuid>,
) -> Result<Json<OcopResponse>, ApiError> {
    let ocop = state
        .ocop_service
        .get(actor.as_ref(), id)
        .await
        .map_err(api_error)?;
    Ok(Json(ocop.into()))
}

/// Submit a certification, or resubmit a rejected one (FARMER owner)
#[utoipa::path(
    put,
    path = "/api/products/{id}/ocop",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = OcopRequest,
    responses(
        (status = 200, description = "Waiting for review", body = OcopResponse),
        (status = 400, description = "Invalid details, or certification not rejected"),
        (status = 403, description = "Product of another farmer"),
        (status = 409, description = "Reviewed while being edited")
    ),
    security(("bearer" = [])),
    tag = "Ocop"
)]
pub async fn submit_ocop(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<OcopRequest>,
) -> Result<Json<OcopResponse>, ApiError> {
    let ocop = state
        .ocop_service
        .submit(&actor, id, payload.into())
        .await
        .map_err(api_error)?;
    Ok(Json(ocop.into()))
}

/// Review queue (ADMIN)
#[utoipa::path(
    get,
    path = "/api/ocop/admin",
    params(OcopListParams),
    responses((status = 200, description = "Certifications, latest first", body = Vec<OcopResponse>)),
    security(("bearer" = [])),
    tag = "Ocop"
)]
pub async fn list_ocops(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<OcopListParams>,
) -> Result<Json<Vec<OcopResponse>>, ApiError> {
    let ocops = state
        .ocop_service
        .list(&actor, params.status)
        .await
        .map_err(api_error)?;
    Ok(Json(ocops.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/ocop/admin/{product_id}/approve",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Verified", body = OcopResponse),
        (status = 400, description = "Not PENDING_VERIFY"),
        (status = 409, description = "Reviewed concurrently")
    ),
    security(("bearer" = [])),
    tag = "Ocop"
)]
pub async fn approve_ocop(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(product_id): Path<Uuid>,
) -> Result<Json<OcopResponse>, ApiError> {
    let ocop = state
        .ocop_service
        .approve(&actor, product_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ocop.into()))
}

#[utoipa::path(
    post,
    path = "/api/ocop/admin/{product_id}/reject",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    request_body = OcopRejectRequest,
    responses(
        (status = 200, description = "Rejected", body = OcopResponse),
        (status = 400, description = "Blank reason or not PENDING_VERIFY"),
        (status = 409, description = "Reviewed concurrently")
    ),
    security(("bearer" = [])),
    tag = "Ocop"
)]
pub async fn reject_ocop(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<OcopRejectRequest>,
) -> Result<Json<OcopResponse>, ApiError> {
    let ocop = state
        .ocop_service
        .reject(&actor, product_id, &payload.reason)
        .await
        .map_err(api_error)?;
    Ok(Json(ocop.into()))
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/api/products/:id/ocop", get(get_ocop))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products/:id/ocop", put(submit_ocop))
        .route("/api/ocop/admin", get(list_ocops))
        .route("/api/ocop/admin/:product_id/approve", post(approve_ocop))
        .route("/api/ocop/admin/:product_id/reject", post(reject_ocop))
}
