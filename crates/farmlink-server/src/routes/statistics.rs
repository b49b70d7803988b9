//! Statistics Routes - Dashboards

use axum::{extract::State, routing::get, Json, Router};

use crate::auth::CurrentActor;
use crate::models::{AdminOverviewResponse, FarmerDashboardResponse};
use crate::AppState;

use super::{api_error, ApiError};

/// Revenue, customers and product figures of the caller's farm
#[utoipa::path(
    get,
    path = "/api/statistics/farmer",
    responses(
        (status = 200, description = "Farmer dashboard", body = FarmerDashboardResponse),
        (status = 403, description = "FARMER role required")
    ),
    security(("bearer" = [])),
    tag = "Statistics"
)]
pub async fn farmer_dashboard(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<FarmerDashboardResponse>, ApiError> {
    let dashboard = state
        .statistics_service
        .farmer_dashboard(&actor)
        .await
        .map_err(api_error)?;
    Ok(Json(dashboard.into()))
}

/// Platform-wide counts and revenue (ADMIN)
#[utoipa::path(
    get,
    path = "/api/statistics/admin",
    responses(
        (status = 200, description = "Admin overview", body = AdminOverviewResponse),
        (status = 403, description = "ADMIN role required")
    ),
    security(("bearer" = [])),
    tag = "Statistics"
)]
pub async fn admin_overview(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<AdminOverviewResponse>, ApiError> {
    let overview = state
        .statistics_service
        .admin_overview(&actor)
        .await
        .map_err(api_error)?;
    Ok(Json(overview.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/statistics/farmer", get(farmer_dashboard))
        .route("/api/statistics/admin", get(admin_overview))
}
