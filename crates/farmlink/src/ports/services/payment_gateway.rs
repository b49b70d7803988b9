//! Payment Gateway Port
//!
//! Redirect-style online payment: build a signed URL for the buyer, then
//! verify the signed fields the gateway sends back.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Data needed to start a payment
#[derive(Debug, Clone)]
pub struct PaymentUrlRequest {
    pub order_id: Uuid,
    /// Amount in VND
    pub amount: i64,
    pub order_info: String,
    pub client_ip: String,
    pub created_at: DateTime<Utc>,
}

pub trait PaymentGateway: Send + Sync {
    /// Signed URL the buyer is redirected to
    fn payment_url(&self, request: &PaymentUrlRequest) -> Result<String, DomainError>;

    /// Whether the fields returned by the gateway carry a valid signature
    fn verify(&self, fields: &BTreeMap<String, String>) -> bool;
}
