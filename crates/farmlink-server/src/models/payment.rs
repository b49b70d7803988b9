//! Payment DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use farmlink::domain::services::{IpnAck, IpnOutcome};
use farmlink::{Payment, PaymentMethod, PaymentStatus};

use crate::application::PaymentState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentUrlResponse {
    pub order_id: Uuid,
    pub payment_url: String,
}

/// Acknowledgement body expected by VNPay on the IPN endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct IpnResponse {
    #[serde(rename = "RspCode")]
    pub rsp_code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

impl From<IpnOutcome> for IpnResponse {
    fn from(outcome: IpnOutcome) -> Self {
        let ack = IpnAck::from(outcome);
        Self {
            rsp_code: ack.rsp_code,
            message: ack.message,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentRecordResponse {
    pub id: Uuid,
    pub amount: i64,
    pub transaction_no: Option<String>,
    pub bank_code: Option<String>,
    pub card_type: Option<String>,
    pub response_code: Option<String>,
    /// `yyyyMMddHHmmss` as reported by the gateway
    pub pay_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentRecordResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            amount: p.amount,
            transaction_no: p.transaction_no,
            bank_code: p.bank_code,
            card_type: p.card_type,
            response_code: p.response_code,
            pay_date: p.pay_date,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStatusResponse {
    pub order_id: Uuid,
    #[schema(value_type = String, example = "VNPAY")]
    pub payment_method: PaymentMethod,
    #[schema(value_type = String, example = "PAID")]
    pub payment_status: PaymentStatus,
    pub payment: Option<PaymentRecordResponse>,
}

impl From<PaymentState> for PaymentStatusResponse {
    fn from(s: PaymentState) -> Self {
        Self {
            order_id: s.order_id,
            payment_method: s.payment_method,
            payment_status: s.payment_status,
            payment: s.payment.map(Into::into),
        }
    }
}
