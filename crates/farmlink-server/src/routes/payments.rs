//! Payment Routes - VNPay checkout, browser return and IPN
//!
//! All routes answer 503 when VNPay credentials are not configured.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::adapters::vnpay::normalize_client_ip;
use crate::auth::CurrentActor;
use crate::models::{
    CreatePaymentRequest, IpnResponse, OrderResponse, PaymentStatusResponse, PaymentUrlResponse,
};
use crate::{AppPaymentService, AppState};

use super::{api_error, ApiError};

fn payments(state: &AppState) -> Result<&Arc<AppPaymentService>, ApiError> {
    state.payment_service.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "Online payment is not configured".to_string(),
    ))
}

/// First hop of X-Forwarded-For, then X-Real-IP, then loopback
fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    normalize_client_ip(forwarded.or(real).unwrap_or("127.0.0.1"))
}

/// Signed VNPay URL for an unpaid order of the caller
#[utoipa::path(
    post,
    path = "/api/payments/vnpay/create",
    request_body = CreatePaymentRequest,
    responses(
        (status = 200, description = "Redirect URL", body = PaymentUrlResponse),
        (status = 403, description = "Order of another account"),
        (status = 409, description = "Order is not payable online"),
        (status = 503, description = "VNPay not configured")
    ),
    security(("bearer" = [])),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    headers: HeaderMap,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<Json<PaymentUrlResponse>, ApiError> {
    let payment_url = payments(&state)?
        .create_payment_url(&actor, payload.order_id, &client_ip(&headers))
        .await
        .map_err(api_error)?;
    Ok(Json(PaymentUrlResponse {
        order_id: payload.order_id,
        payment_url,
    }))
}

/// Verify the browser return and show the order; changes nothing
#[utoipa::path(
    get,
    path = "/api/payments/vnpay/return",
    responses(
        (status = 200, description = "Order paid for", body = OrderResponse),
        (status = 403, description = "Invalid signature")
    ),
    security(("bearer" = [])),
    tag = "Payments"
)]
pub async fn vnpay_return(
    State(state): State<AppState>,
    Query(fields): Query<BTreeMap<String, String>>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = payments(&state)?
        .handle_return(&fields)
        .await
        .map_err(api_error)?;
    Ok(Json(order.into()))
}

/// Server-to-server payment notification from VNPay
#[utoipa::path(
    get,
    path = "/api/payments/vnpay/ipn",
    responses(
        (status = 200, description = "Acknowledgement with RspCode", body = IpnResponse),
        (status = 503, description = "VNPay not configured")
    ),
    tag = "Payments"
)]
pub async fn vnpay_ipn(
    State(state): State<AppState>,
    Query(fields): Query<BTreeMap<String, String>>,
) -> Result<Json<IpnResponse>, ApiError> {
    let outcome = payments(&state)?
        .handle_ipn(&fields)
        .await
        .map_err(api_error)?;
    Ok(Json(outcome.into()))
}

/// Payment method, status and recorded transaction of an order
#[utoipa::path(
    get,
    path = "/api/payments/{order_id}/status",
    params(("order_id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Payment state", body = PaymentStatusResponse),
        (status = 403, description = "Not a party to the order")
    ),
    security(("bearer" = [])),
    tag = "Payments"
)]
pub async fn payment_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(order_id): Path<Uuid>,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    let payment = payments(&state)?
        .payment_status(&actor, order_id)
        .await
        .map_err(api_error)?;
    Ok(Json(payment.into()))
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/api/payments/vnpay/ipn", get(vnpay_ipn))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/payments/vnpay/create", post(create_payment))
        .route("/api/payments/vnpay/return", get(vnpay_return))
        .route("/api/payments/:order_id/status", get(payment_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.7");

        headers.remove("x-forwarded-for");
        assert_eq!(client_ip(&headers), "10.0.0.2");
    }

    #[test]
    fn client_ip_defaults_to_loopback() {
        assert_eq!(client_ip(&HeaderMap::new()), "127.0.0.1");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("::1"));
        assert_eq!(client_ip(&headers), "127.0.0.1");
    }
}
