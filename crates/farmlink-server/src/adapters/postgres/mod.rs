//! PostgreSQL Repository Implementations

mod account_repository;
mod address_repository;
mod cart_repository;
mod category_repository;
mod farmer_repository;
mod market_price_repository;
mod ocop_repository;
mod order_repository;
mod payment_repository;
mod product_repository;

pub use account_repository::PgAccountRepository;
pub use address_repository::PgAddressRepository;
pub use cart_repository::PgCartRepository;
pub use category_repository::PgCategoryRepository;
pub use farmer_repository::PgFarmerRepository;
pub use market_price_repository::PgMarketPriceRepository;
pub use ocop_repository::PgOcopRepository;
pub use order_repository::PgOrderRepository;
pub use payment_repository::PgPaymentRepository;
pub use product_repository::PgProductRepository;

use farmlink::DomainError;

/// Map a sqlx error to a domain error; constraint violations become conflicts
pub(crate) fn db_error(e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some("23505") => return DomainError::conflict(format!("Duplicate value: {}", db.message())),
            Some("23503") => {
                return DomainError::conflict(format!("Still referenced: {}", db.message()))
            }
            Some("23514") => return DomainError::validation(db.message().to_string()),
            _ => {}
        }
    }
    tracing::error!("Database error: {}", e);
    DomainError::Repository(e.to_string())
}

/// Parse a TEXT column holding an enum name
pub(crate) fn parse_column<T>(raw: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse().map_err(DomainError::Repository)
}
