//! Repository Ports
//!
//! Abstract interfaces for data persistence operations.

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

pub use account_repository::*;
pub use address_repository::*;
pub use cart_repository::*;
pub use category_repository::*;
pub use farmer_repository::*;
pub use market_price_repository::*;
pub use ocop_repository::*;
pub use order_repository::*;
pub use payment_repository::*;
pub use product_repository::*;
