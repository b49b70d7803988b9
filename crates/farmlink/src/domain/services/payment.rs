//! Payment - Deciding what a gateway payment notification means

use serde::{Deserialize, Serialize};

use crate::domain::entities::Order;
use crate::domain::value_objects::{OrderStatus, PaymentMethod, PaymentStatus};
use crate::domain::errors::DomainError;

/// Gateway amounts are expressed in hundredths of a VND
pub const GATEWAY_AMOUNT_FACTOR: i64 = 100;

/// Result of processing an instant payment notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpnOutcome {
    InvalidSignature,
    OrderNotFound,
    InvalidAmount,
    AlreadyConfirmed,
    Confirmed,
    Failed,
}

impl IpnOutcome {
    pub fn rsp_code(&self) -> &'static str {
        match self {
            IpnOutcome::InvalidSignature => "97",
            IpnOutcome::OrderNotFound => "01",
            IpnOutcome::InvalidAmount => "04",
            IpnOutcome::AlreadyConfirmed => "02",
            IpnOutcome::Confirmed | IpnOutcome::Failed => "00",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            IpnOutcome::InvalidSignature => "Invalid signature",
            IpnOutcome::OrderNotFound => "Order not found",
            IpnOutcome::InvalidAmount => "Invalid amount",
            IpnOutcome::AlreadyConfirmed => "Order already confirmed",
            IpnOutcome::Confirmed => "Confirm Success",
            IpnOutcome::Failed => "Payment failed",
        }
    }

    pub fn is_acknowledged(&self) -> bool {
        self.rsp_code() == "00"
    }
}

/// Response body the gateway expects from the IPN endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IpnAck {
    #[serde(rename = "RspCode")]
    pub rsp_code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

impl From<IpnOutcome> for IpnAck {
    fn from(outcome: IpnOutcome) -> Self {
        Self {
            rsp_code: outcome.rsp_code().to_string(),
            message: outcome.message().to_string(),
        }
    }
}

/// Evaluate a notification whose signature has already been verified.
///
/// `gateway_amount` is the raw `vnp_Amount`; both codes must be `"00"`
/// for the payment to count as successful.
pub fn evaluate_ipn(
    order: &Order,
    gateway_amount: Option<&str>,
    response_code: Option<&str>,
    transaction_status: Option<&str>,
) -> IpnOutcome {
    let amount = gateway_amount.and_then(|raw| raw.trim().parse::<i64>().ok());
    let expected = order.total_price.checked_mul(GATEWAY_AMOUNT_FACTOR);
    match (amount, expected) {
        (Some(amount), Some(expected)) if amount == expected => {}
        _ => return IpnOutcome::InvalidAmount,
    }

    if order.payment_status == PaymentStatus::Paid {
        return IpnOutcome::AlreadyConfirmed;
    }

    if response_code == Some("00") && transaction_status == Some("00") {
        IpnOutcome::Confirmed
    } else {
        IpnOutcome::Failed
    }
}

/// Whether an online payment may be started for `order`
pub fn ensure_payable(order: &Order) -> Result<(), DomainError> {
    if order.payment_method != PaymentMethod::Vnpay {
        return Err(DomainError::validation("order is not paid online"));
    }
    if order.status == OrderStatus::Canceled {
        return Err(DomainError::conflict("order is canceled"));
    }
    if order.payment_status != PaymentStatus::Pending {
        return Err(DomainError::conflict(format!(
            "order payment is already {}",
            order.payment_status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OrderItem;
    use crate::domain::value_objects::PostalAddress;
    use uuid::Uuid;

    fn order() -> Order {
        Order::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            PostalAddress {
                receiver_name: "Minh".into(),
                receiver_phone: "0987654321".into(),
                province: "Cần Thơ".into(),
                district: "Ninh Kiều".into(),
                ward: "An Hòa".into(),
                detail: "5 Mậu Thân".into(),
            },
            None,
            vec![OrderItem {
                product_id: Uuid::new_v4(),
                product_name: "Xoài".into(),
                thumbnail: None,
                unit_price: 50_000,
                quantity: 3,
            }],
            PaymentMethod::Vnpay,
        )
    }

    #[test]
    fn test_successful_payment() {
        let outcome = evaluate_ipn(&order(), Some("15000000"), Some("00"), Some("00"));
        assert_eq!(outcome, IpnOutcome::Confirmed);
        assert_eq!(IpnAck::from(outcome).message, "Confirm Success");
    }

    #[test]
    fn test_amount_mismatch() {
        let outcome = evaluate_ipn(&order(), Some("150000"), Some("00"), Some("00"));
        assert_eq!(outcome.rsp_code(), "04");
        assert_eq!(evaluate_ipn(&order(), None, Some("00"), Some("00")), IpnOutcome::InvalidAmount);
    }

    #[test]
    fn test_unrepresentable_total_is_invalid_amount() {
        let mut huge = order();
        huge.total_price = i64::MAX / 10;
        let outcome = evaluate_ipn(&huge, Some(&i64::MAX.to_string()), Some("00"), Some("00"));
        assert_eq!(outcome, IpnOutcome::InvalidAmount);
    }

    #[test]
    fn test_already_paid_and_failed() {
        let mut paid = order();
        paid.payment_status = PaymentStatus::Paid;
        assert_eq!(
            evaluate_ipn(&paid, Some("15000000"), Some("00"), Some("00")),
            IpnOutcome::AlreadyConfirmed
        );

        let failed = evaluate_ipn(&order(), Some("15000000"), Some("24"), Some("02"));
        assert_eq!(failed, IpnOutcome::Failed);
        assert!(failed.is_acknowledged());
    }

    #[test]
    fn test_ensure_payable() {
        let mut o = order();
        assert!(ensure_payable(&o).is_ok());
        o.status = OrderStatus::Canceled;
        assert!(matches!(ensure_payable(&o), Err(DomainError::Conflict(_))));

        let mut cod = order();
        cod.payment_method = PaymentMethod::Cod;
        assert!(matches!(ensure_payable(&cod), Err(DomainError::Validation(_))));
    }
}
