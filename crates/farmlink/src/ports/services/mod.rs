//! Service Ports
//!
//! Abstract interfaces for credential handling and payment gateways.

mod credentials;
mod payment_gateway;

pub use credentials::*;
pub use payment_gateway::*;
