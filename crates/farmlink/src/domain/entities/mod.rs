//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Account: login identity with roles and notification preferences
//! - Address: saved delivery address of an account
//! - Farmer: seller profile attached to an account
//! - Category: node of the product category tree
//! - Product: item offered by a farmer
//! - MarketPrice: observed regional price of a product
//! - Ocop: OCOP certification of a product and its review
//! - CartItem: product waiting in a consumer's cart
//! - Order: checkout result with its status history
//! - Payment: settled online payment of an order

mod account;
mod address;
mod cart;
mod category;
mod farmer;
mod market_price;
mod ocop;
mod order;
mod payment;
mod product;

pub use account::*;
pub use address::*;
pub use cart::*;
pub use category::*;
pub use farmer::*;
pub use market_price::*;
pub use ocop::*;
pub use order::*;
pub use payment::*;
pub use product::*;
