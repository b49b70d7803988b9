use std::sync::Arc;

use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use chrono::FixedOffset;
use serde::Serialize;
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use farmlink::{PasswordHasher, PaymentGateway, TokenIssuer};

mod adapters;
mod application;
mod auth;
mod config;
mod models;
mod routes;

use adapters::{
    Argon2PasswordHasher, JwtTokenIssuer, PgAccountRepository, PgAddressRepository,
    PgCartRepository, PgCategoryRepository, PgFarmerRepository, PgMarketPriceRepository,
    PgOcopRepository, PgOrderRepository, PgPaymentRepository, PgProductRepository, VnpayGateway,
};
use application::{
    AccountService, AddressService, AuthService, CartService, CategoryService, FarmerService,
    MarketPriceService, OcopService, OrderService, PaymentService, ProductService, StatisticsService,
};
use config::ServerConfig;

/// Type aliases for application services with concrete repository implementations
pub type AppAuthService = AuthService<PgAccountRepository, PgFarmerRepository>;
pub type AppAccountService = AccountService<PgAccountRepository>;
pub type AppAddressService = AddressService<PgAddressRepository>;
pub type AppFarmerService = FarmerService<PgFarmerRepository>;
pub type AppCategoryService = CategoryService<PgCategoryRepository, PgProductRepository>;
pub type AppProductService =
    ProductService<PgProductRepository, PgCategoryRepository, PgFarmerRepository>;
pub type AppMarketPriceService = MarketPriceService<PgMarketPriceRepository, PgProductRepository>;
pub type AppOcopService = OcopService<PgOcopRepository, PgProductRepository>;
pub type AppCartService = CartService<PgCartRepository, PgProductRepository>;
pub type AppOrderService = OrderService<
    PgOrderRepository,
    PgCartRepository,
    PgProductRepository,
    PgAddressRepository,
    PgFarmerRepository,
>;
pub type AppPaymentService = PaymentService<PgOrderRepository, PgPaymentRepository>;
pub type AppStatisticsService = StatisticsService<
    PgOrderRepository,
    PgProductRepository,
    PgAccountRepository,
    PgFarmerRepository,
>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub token_issuer: Arc<dyn TokenIssuer>,
    pub auth_service: Arc<AppAuthService>,
    pub account_service: Arc<AppAccountService>,
    pub address_service: Arc<AppAddressService>,
    pub farmer_service: Arc<AppFarmerService>,
    pub category_service: Arc<AppCategoryService>,
    pub product_service: Arc<AppProductService>,
    pub market_price_service: Arc<AppMarketPriceService>,
    pub ocop_service: Arc<AppOcopService>,
    pub cart_service: Arc<AppCartService>,
    pub order_service: Arc<AppOrderService>,
    /// None when VNPay is not configured
    pub payment_service: Option<Arc<AppPaymentService>>,
    pub statistics_service: Arc<AppStatisticsService>,
}

#[derive(Serialize, ToSchema)]
pub struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthCheck)),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "FarmLink API is running - from the field to the table".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Wire repositories, adapters and services over one pool
fn build_state(pool: PgPool, config: &ServerConfig) -> anyhow::Result<AppState> {
    let stats_offset = FixedOffset::east_opt(config.stats_utc_offset_hours * 3600)
        .context("Invalid statistics UTC offset")?;

    // Repositories
    let accounts = Arc::new(PgAccountRepository::new(pool.clone()));
    let addresses = Arc::new(PgAddressRepository::new(pool.clone()));
    let farmers = Arc::new(PgFarmerRepository::new(pool.clone()));
    let categories = Arc::new(PgCategoryRepository::new(pool.clone()));
    let products = Arc::new(PgProductRepository::new(pool.clone()));
    let market_prices = Arc::new(PgMarketPriceRepository::new(pool.clone()));
    let ocops = Arc::new(PgOcopRepository::new(pool.clone()));
    let cart = Arc::new(PgCartRepository::new(pool.clone()));
    let orders = Arc::new(PgOrderRepository::new(pool.clone()));
    let payments = Arc::new(PgPaymentRepository::new(pool));

    // Credentials
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let token_issuer: Arc<dyn TokenIssuer> = Arc::new(JwtTokenIssuer::new(
        &config.jwt_secret,
        config.access_token_minutes,
        config.refresh_token_days,
    ));

    // Payments
    let payment_service = config.vnpay.clone().map(|vnpay| {
        let gateway: Arc<dyn PaymentGateway> = Arc::new(VnpayGateway::new(vnpay));
        Arc::new(PaymentService::new(orders.clone(), payments, gateway))
    });

    Ok(AppState {
        auth_service: Arc::new(AuthService::new(
            accounts.clone(),
            farmers.clone(),
            hasher,
            token_issuer.clone(),
        )),
        token_issuer,
        account_service: Arc::new(AccountService::new(accounts.clone())),
        address_service: Arc::new(AddressService::new(addresses.clone())),
        farmer_service: Arc::new(FarmerService::new(farmers.clone())),
        category_service: Arc::new(CategoryService::new(categories.clone(), products.clone())),
        product_service: Arc::new(ProductService::new(
            products.clone(),
            categories,
            farmers.clone(),
        )),
        market_price_service: Arc::new(MarketPriceService::new(market_prices, products.clone())),
        ocop_service: Arc::new(OcopService::new(ocops, products.clone())),
        cart_service: Arc::new(CartService::new(cart.clone(), products.clone())),
        order_service: Arc::new(OrderService::new(
            orders.clone(),
            cart,
            products.clone(),
            addresses,
            farmers.clone(),
        )),
        payment_service,
        statistics_service: Arc::new(StatisticsService::new(
            orders,
            products,
            accounts,
            farmers,
            stats_offset,
        )),
    })
}

/// Full HTTP surface: public and protected API, health, Swagger UI
fn build_router(state: AppState) -> Router {
    // Public routes (a bearer token is optional but must be valid when sent)
    let public_routes = Router::new()
        .merge(routes::auth::public_router())
        .merge(routes::categories::public_router())
        .merge(routes::products::public_router())
        .merge(routes::market_prices::public_router())
        .merge(routes::ocop::public_router())
        .merge(routes::farmers::public_router())
        .merge(routes::payments::public_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::optional_auth,
        ));

    // Protected routes (require authentication)
    let protected_routes = Router::new()
        .merge(routes::accounts::router())
        .merge(routes::addresses::router())
        .merge(routes::farmers::router())
        .merge(routes::categories::router())
        .merge(routes::products::router())
        .merge(routes::market_prices::router())
        .merge(routes::ocop::router())
        .merge(routes::cart::router())
        .merge(routes::orders::router())
        .merge(routes::payments::router())
        .merge(routes::statistics::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    // OpenAPI documentation
    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("🌾 FarmLink API initializing...");

    let config = ServerConfig::from_secrets(&secrets)?;

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("✅ Database migrations completed");

    let state = build_state(pool, &config)?;
    tracing::info!(
        "🔐 JWT authentication enabled (access {}m, refresh {}d)",
        config.access_token_minutes,
        config.refresh_token_days
    );

    if let Some(admin) = &config.admin {
        match state
            .auth_service
            .seed_admin(&admin.email, &admin.password)
            .await
            .context("Failed to seed administrator")?
        {
            Some(account) => tracing::info!("👤 Administrator created: {}", account.email),
            None => tracing::info!("👤 Administrator already present"),
        }
    } else {
        tracing::warn!("⚠️  No ADMIN_EMAIL set - administrator seeding skipped");
    }

    if state.payment_service.is_some() {
        tracing::info!("💳 VNPay payments enabled");
    } else {
        tracing::warn!("⚠️  No VNPAY_TMN_CODE set - online payment disabled");
    }

    let router = build_router(state);

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ FarmLink API ready");

    Ok(router.into())
}
