//! Domain Services
//!
//! Pure business rules shared by the application layer. Nothing in here
//! touches storage or the network.

pub mod category_tree;
pub mod checkout;
pub mod order_workflow;
pub mod payment;
pub mod statistics;

pub use category_tree::*;
pub use checkout::*;
pub use order_workflow::*;
pub use payment::*;
pub use statistics::*;
