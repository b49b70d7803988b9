//! Payment - Settled online payment of an order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::PaymentMethod;

/// Gateway transaction details recorded on a successful payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub method: PaymentMethod,
    /// Amount in VND
    pub amount: i64,
    pub transaction_no: Option<String>,
    pub bank_code: Option<String>,
    pub card_type: Option<String>,
    pub response_code: Option<String>,
    /// Gateway-reported payment time, as sent (`yyyyMMddHHmmss`)
    pub pay_date: Option<String>,
    pub created_at: DateTime<Utc>,
}
