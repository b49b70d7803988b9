//! FarmLink API Routes
//!
//! - /api/auth - Registration, login and token rotation
//! - /api/accounts - Own profile, notification settings, admin listing
//! - /api/addresses - Saved delivery addresses
//! - /api/farmers - Farmer profiles and farm address
//! - /api/categories - Category tree
//! - /api/products - Catalogue and product management
//! - /api/market-prices - Regional market prices
//! - /api/products/:id/ocop, /api/admin/ocop - OCOP certification and review
//! - /api/cart - Shopping cart
//! - /api/orders - Checkout and order workflow
//! - /api/payments - VNPay payments
//! - /api/statistics - Farmer and admin dashboards

pub mod accounts;
pub mod addresses;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod farmers;
pub mod market_prices;
pub mod ocop;
pub mod orders;
pub mod payments;
pub mod products;
pub mod statistics;
pub mod swagger;

use axum::http::StatusCode;

use farmlink::DomainError;

pub type ApiError = (StatusCode, String);

/// Map a domain failure onto the HTTP status the API reports for it
pub fn api_error(error: DomainError) -> ApiError {
    let status = match &error {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::ExternalService(_) => StatusCode::BAD_GATEWAY,
    };
    if status.is_server_error() {
        tracing::error!("{}", error);
    }
    (status, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::not_found("Order", Uuid::nil()), StatusCode::NOT_FOUND),
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::conflict("taken"), StatusCode::CONFLICT),
            (DomainError::forbidden("no"), StatusCode::FORBIDDEN),
            (DomainError::Unauthorized("who".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Repository("db".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::ExternalService("vnpay".into()), StatusCode::BAD_GATEWAY),
        ];
        for (error, expected) in cases {
            assert_eq!(api_error(error).0, expected);
        }
    }
}
