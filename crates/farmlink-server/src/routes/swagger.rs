//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models::{
    // Accounts
    AccountResponse,
    // Addresses
    AddressRequest,
    AddressResponse,
    // Cart
    AddToCartRequest,
    // Statistics
    AdminOverviewResponse,
    CartItemResponse,
    CartLineResponse,
    // Catalog
    CategoryNodeResponse,
    CategoryRequest,
    CategoryResponse,
    ChangeOrderStatusRequest,
    ChangePasswordRequest,
    ChannelSettingsDto,
    ClearCartResponse,
    CreateMarketPriceRequest,
    // Orders
    CreateOrderRequest,
    // Payments
    CreatePaymentRequest,
    CustomerOrdersResponse,
    FarmerDashboardResponse,
    // Farmers
    FarmerResponse,
    FarmerStatusRequest,
    IpnResponse,
    LoginRequest,
    MarketPriceResponse,
    // Common
    MessageResponse,
    MonthlyFiguresResponse,
    NextStatusesResponse,
    NotificationSettingsDto,
    // OCOP
    OcopRejectRequest,
    OcopRequest,
    OcopResponse,
    OrderItemResponse,
    OrderResponse,
    PaymentRecordResponse,
    PaymentStatusResponse,
    PaymentUrlResponse,
    PostalAddressDto,
    ProductNameResponse,
    ProductPageResponse,
    ProductRequest,
    ProductResponse,
    ProductSalesResponse,
    ProductStatusRequest,
    ProductSummaryResponse,
    // Auth
    RefreshRequest,
    RegisterRequest,
    StatusChangeResponse,
    StatusCountResponse,
    TokenResponse,
    UpdateCartItemRequest,
    UpdateFarmerRequest,
    UpdateMarketPriceRequest,
    UpdateProfileRequest,
    UpgradeFarmerRequest,
    UpgradeFarmerResponse,
};

use crate::HealthCheck;

/// Registers the bearer scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health_check,
        // Auth endpoints
        super::auth::register,
        super::auth::login,
        super::auth::refresh,
        super::auth::logout,
        // Account endpoints
        super::accounts::get_me,
        super::accounts::update_me,
        super::accounts::change_password,
        super::accounts::get_notification_settings,
        super::accounts::update_notification_settings,
        super::accounts::list_accounts,
        super::accounts::delete_account,
        // Address endpoints
        super::addresses::create_address,
        super::addresses::list_addresses,
        super::addresses::get_address,
        super::addresses::update_address,
        super::addresses::set_default_address,
        super::addresses::delete_address,
        // Farmer endpoints
        super::farmers::upgrade,
        super::farmers::get_farmer,
        super::farmers::list_farmer_products,
        super::farmers::get_my_farmer,
        super::farmers::update_my_farmer,
        super::farmers::list_farmers,
        super::farmers::change_farmer_status,
        super::farmers::create_farm_address,
        super::farmers::update_farm_address,
        super::farmers::delete_farm_address,
        // Category endpoints
        super::categories::get_tree,
        super::categories::create_category,
        super::categories::update_category,
        super::categories::delete_category,
        // Product endpoints
        super::products::catalogue,
        super::products::product_names,
        super::products::get_product,
        super::products::create_product,
        super::products::update_product,
        super::products::delete_product,
        super::products::list_my_products,
        super::products::list_all_products,
        super::products::change_product_status,
        // Market price endpoints
        super::market_prices::list_market_prices,
        super::market_prices::get_market_price,
        super::market_prices::create_market_price,
        super::market_prices::update_market_price,
        super::market_prices::delete_market_price,
        // OCOP endpoints
        super::ocop::get_ocop,
        super::ocop::submit_ocop,
        super::ocop::list_ocops,
        super::ocop::approve_ocop,
        super::ocop::reject_ocop,
        // Cart endpoints
        super::cart::list_cart,
        super::cart::add_to_cart,
        super::cart::update_cart_item,
        super::cart::remove_cart_item,
        super::cart::clear_cart,
        // Order endpoints
        super::orders::create_order,
        super::orders::list_my_orders,
        super::orders::list_farmer_orders,
        super::orders::list_all_orders,
        super::orders::get_order,
        super::orders::consumer_change_status,
        super::orders::farmer_change_status,
        super::orders::admin_change_status,
        // Payment endpoints
        super::payments::create_payment,
        super::payments::vnpay_return,
        super::payments::vnpay_ipn,
        super::payments::payment_status,
        // Statistics endpoints
        super::statistics::farmer_dashboard,
        super::statistics::admin_overview,
    ),
    info(
        title = "FarmLink API",
        version = "0.1.0",
        description = "FarmLink - Marketplace connecting farmers with consumers\n\nCatalogue, cart, checkout, order fulfilment and VNPay payments.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration, login and token rotation"),
        (name = "Accounts", description = "Own profile and account administration"),
        (name = "Addresses", description = "Delivery addresses"),
        (name = "Farmers", description = "Farmer profiles and moderation"),
        (name = "Categories", description = "Category tree"),
        (name = "Products", description = "Catalogue and product management"),
        (name = "MarketPrices", description = "Regional market prices"),
        (name = "Ocop", description = "OCOP certification and review"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Orders", description = "Checkout and order workflow"),
        (name = "Payments", description = "VNPay online payment"),
        (name = "Statistics", description = "Farmer and admin dashboards"),
    ),
    components(
        schemas(
            HealthCheck,
            MessageResponse,
            PostalAddressDto,
            // Auth
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            ChangePasswordRequest,
            TokenResponse,
            // Accounts
            AccountResponse,
            UpdateProfileRequest,
            ChannelSettingsDto,
            NotificationSettingsDto,
            // Addresses
            AddressRequest,
            AddressResponse,
            // Farmers
            FarmerResponse,
            UpgradeFarmerRequest,
            UpgradeFarmerResponse,
            UpdateFarmerRequest,
            FarmerStatusRequest,
            // Catalog
            CategoryRequest,
            CategoryResponse,
            CategoryNodeResponse,
            ProductRequest,
            ProductResponse,
            ProductSummaryResponse,
            ProductNameResponse,
            ProductPageResponse,
            ProductStatusRequest,
            CreateMarketPriceRequest,
            UpdateMarketPriceRequest,
            MarketPriceResponse,
            // OCOP
            OcopRequest,
            OcopRejectRequest,
            OcopResponse,
            // Cart
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemResponse,
            CartLineResponse,
            ClearCartResponse,
            // Orders
            CreateOrderRequest,
            ChangeOrderStatusRequest,
            OrderItemResponse,
            StatusChangeResponse,
            NextStatusesResponse,
            OrderResponse,
            // Payments
            CreatePaymentRequest,
            PaymentUrlResponse,
            IpnResponse,
            PaymentRecordResponse,
            PaymentStatusResponse,
            // Statistics
            ProductSalesResponse,
            CustomerOrdersResponse,
            MonthlyFiguresResponse,
            StatusCountResponse,
            FarmerDashboardResponse,
            AdminOverviewResponse,
        )
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/auth/login",
            "/api/products/{id}",
            "/api/products/{id}/ocop",
            "/api/ocop/admin/{product_id}/reject",
            "/api/orders/farmer/change-status",
            "/api/payments/vnpay/ipn",
            "/api/statistics/admin",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.schemas.contains_key("OrderResponse"));
    }
}
