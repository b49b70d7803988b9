//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

pub mod credentials;
pub mod postgres;
pub mod vnpay;

// Re-exports
pub use credentials::{Argon2PasswordHasher, JwtTokenIssuer};
pub use postgres::{
    PgAccountRepository, PgAddressRepository, PgCartRepository, PgCategoryRepository,
    PgFarmerRepository, PgMarketPriceRepository, PgOcopRepository, PgOrderRepository,
    PgPaymentRepository, PgProductRepository,
};
pub use vnpay::VnpayGateway;
