//! FarmLink API Models
//!
//! Request/response DTOs exchanged over HTTP. Domain types stay free of
//! OpenAPI derives; each DTO converts from its domain counterpart.

mod account;
mod address;
mod auth;
mod cart;
mod catalog;
mod common;
mod farmer;
mod ocop;
mod order;
mod payment;
mod statistics;

pub use account::*;
pub use address::*;
pub use auth::*;
pub use cart::*;
pub use catalog::*;
pub use common::*;
pub use farmer::*;
pub use ocop::*;
pub use order::*;
pub use payment::*;
pub use statistics::*;
