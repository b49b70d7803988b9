//! Application Layer (Use Cases)
//!
//! Orchestrates domain operations and coordinates between
//! repositories and external services.

mod account_service;
mod address_service;
mod auth_service;
mod cart_service;
mod category_service;
mod farmer_service;
mod market_price_service;
mod ocop_service;
mod order_service;
mod payment_service;
mod product_service;
mod statistics_service;

#[cfg(test)]
mod testing;

pub use account_service::{AccountService, ProfileUpdate};
pub use address_service::AddressService;
pub use auth_service::{AuthService, TokenPair};
pub use cart_service::CartService;
pub use category_service::CategoryService;
pub use farmer_service::{FarmerService, FarmerUpdate};
pub use market_price_service::{MarketPricePatch, MarketPriceService, MarketPriceView};
pub use ocop_service::{OcopService, OcopView};
pub use order_service::{Checkout, OrderService};
pub use payment_service::{PaymentService, PaymentState};
pub use product_service::ProductService;
pub use statistics_service::StatisticsService;
