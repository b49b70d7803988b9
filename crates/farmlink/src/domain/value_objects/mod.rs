//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod actor;
mod farmer_status;
mod notification_settings;
mod ocop_status;
mod order_status;
mod page;
mod postal_address;
mod product_status;
mod role;

pub use actor::*;
pub use farmer_status::*;
pub use notification_settings::*;
pub use ocop_status::*;
pub use order_status::*;
pub use page::*;
pub use postal_address::*;
pub use product_status::*;
pub use role::*;
