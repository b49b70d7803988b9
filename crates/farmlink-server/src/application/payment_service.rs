//! Payment Application Service (Use Case)
//!
//! Starts online payments and settles them from gateway callbacks.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use farmlink::domain::services::{ensure_payable, evaluate_ipn, IpnOutcome};
use farmlink::{
    Actor, DomainError, Order, OrderRepository, Payment, PaymentGateway, PaymentMethod,
    PaymentRepository, PaymentStatus, PaymentUrlRequest, Role,
};

const TXN_REF: &str = "vnp_TxnRef";

/// Payment state of one order as shown to its parties
#[derive(Debug, Clone, Serialize)]
pub struct PaymentState {
    pub order_id: Uuid,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub payment: Option<Payment>,
}

pub struct PaymentService<O: OrderRepository, Y: PaymentRepository> {
    orders: Arc<O>,
    payments: Arc<Y>,
    gateway: Arc<dyn PaymentGateway>,
}

impl<O: OrderRepository, Y: PaymentRepository> PaymentService<O, Y> {
    pub fn new(orders: Arc<O>, payments: Arc<Y>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            orders,
            payments,
            gateway,
        }
    }

    /// Signed redirect URL for paying `order_id` online
    pub async fn create_payment_url(
        &self,
        actor: &Actor,
        order_id: Uuid,
        client_ip: &str,
    ) -> Result<String, DomainError> {
        let order = self.find(order_id).await?;
        if order.account_id != actor.account_id {
            return Err(DomainError::forbidden("order belongs to another account"));
        }
        ensure_payable(&order)?;

        let url = self.gateway.payment_url(&PaymentUrlRequest {
            order_id: order.id,
            amount: order.total_price,
            order_info: format!("Thanh toan don hang {}", order.id),
            client_ip: client_ip.to_string(),
            created_at: Utc::now(),
        })?;

        tracing::info!("Payment URL issued for order {}", order.id);
        Ok(url)
    }

    /// Browser return from the gateway; read-only
    pub async fn handle_return(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<Order, DomainError> {
        if !self.gateway.verify(fields) {
            tracing::warn!("Payment return with invalid signature");
            return Err(DomainError::forbidden("invalid payment signature"));
        }
        let raw = fields.get(TXN_REF).map(String::as_str).unwrap_or_default();
        let order_id =
            Uuid::parse_str(raw).map_err(|_| DomainError::not_found_str("Order", raw))?;
        self.find(order_id).await
    }

    /// Server-to-server notification; decides and records the payment result
    pub async fn handle_ipn(
        &self,
        fields: &BTreeMap<String, String>,
    ) -> Result<IpnOutcome, DomainError> {
        if !self.gateway.verify(fields) {
            tracing::warn!("IPN with invalid signature");
            return Ok(IpnOutcome::InvalidSignature);
        }

        let order = match fields
            .get(TXN_REF)
            .and_then(|raw| Uuid::parse_str(raw).ok())
        {
            Some(id) => self.orders.find_by_id(id).await?,
            None => None,
        };
        let Some(order) = order else {
            return Ok(IpnOutcome::OrderNotFound);
        };

        let field = |key: &str| fields.get(key).map(String::as_str);
        let outcome = evaluate_ipn(
            &order,
            field("vnp_Amount"),
            field("vnp_ResponseCode"),
            field("vnp_TransactionStatus"),
        );

        match outcome {
            IpnOutcome::Confirmed => {
                let payment = Payment {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    method: PaymentMethod::Vnpay,
                    amount: order.total_price,
                    transaction_no: field("vnp_TransactionNo").map(str::to_string),
                    bank_code: field("vnp_BankCode").map(str::to_string),
                    card_type: field("vnp_CardType").map(str::to_string),
                    response_code: field("vnp_ResponseCode").map(str::to_string),
                    pay_date: field("vnp_PayDate").map(str::to_string),
                    created_at: Utc::now(),
                };
                if !self.payments.record_success(&payment).await? {
                    return Ok(IpnOutcome::AlreadyConfirmed);
                }
                tracing::info!("Order {} paid online", order.id);
            }
            IpnOutcome::Failed => {
                self.orders
                    .update_payment_status(order.id, PaymentStatus::Pending, PaymentStatus::Failed)
                    .await?;
                tracing::warn!("Online payment failed for order {}", order.id);
            }
            _ => {
                tracing::warn!("IPN rejected for order {}: {}", order.id, outcome.message());
            }
        }

        Ok(outcome)
    }

    pub async fn payment_status(
        &self,
        actor: &Actor,
        order_id: Uuid,
    ) -> Result<PaymentState, DomainError> {
        let order = self.find(order_id).await?;
        let is_party = order.account_id == actor.account_id
            || (actor.has_role(Role::Farmer) && actor.farmer_id == Some(order.farmer_id));
        if !is_party && !actor.is_admin() {
            return Err(DomainError::forbidden("order belongs to another account"));
        }

        Ok(PaymentState {
            order_id: order.id,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            payment: self.payments.find_by_order(order.id).await?,
        })
    }

    async fn find(&self, id: Uuid) -> Result<Order, DomainError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{postal, FakeGateway, MemoryDb};
    use farmlink::{OrderItem, OrderStatus};

    fn vnpay_order(db: &Arc<MemoryDb>, buyer: &Actor) -> Order {
        let order = Order::new(
            buyer.account_id,
            Uuid::new_v4(),
            postal(),
            None,
            vec![OrderItem {
                product_id: Uuid::new_v4(),
                product_name: "Xoài cát".into(),
                thumbnail: None,
                unit_price: 40_000,
                quantity: 2,
            }],
            PaymentMethod::Vnpay,
        );
        db.insert_order(&order);
        order
    }

    fn ipn(order: &Order, amount: i64, code: &str) -> BTreeMap<String, String> {
        [
            ("vnp_TxnRef", order.id.to_string()),
            ("vnp_Amount", amount.to_string()),
            ("vnp_ResponseCode", code.to_string()),
            ("vnp_TransactionStatus", code.to_string()),
            ("vnp_TransactionNo", "14422574".to_string()),
            ("vnp_BankCode", "NCB".to_string()),
            ("vnp_SecureHash", "valid".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn service(db: &Arc<MemoryDb>) -> PaymentService<MemoryDb, MemoryDb> {
        PaymentService::new(db.clone(), db.clone(), Arc::new(FakeGateway))
    }

    #[tokio::test]
    async fn successful_ipn_records_payment_once() {
        let db = MemoryDb::new();
        let buyer = db.seed_account("buyer@example.com", &[Role::Consumer]);
        let order = vnpay_order(&db, &buyer);
        let service = service(&db);

        let outcome = service.handle_ipn(&ipn(&order, 8_000_000, "00")).await.unwrap();
        assert_eq!(outcome, IpnOutcome::Confirmed);

        let again = service.handle_ipn(&ipn(&order, 8_000_000, "00")).await.unwrap();
        assert_eq!(again, IpnOutcome::AlreadyConfirmed);

        let state = service.payment_status(&buyer, order.id).await.unwrap();
        assert_eq!(state.payment_status, PaymentStatus::Paid);
        assert_eq!(
            state.payment.unwrap().transaction_no.as_deref(),
            Some("14422574")
        );
        assert_eq!(db.payments().len(), 1);
    }

    #[tokio::test]
    async fn ipn_rejections() {
        let db = MemoryDb::new();
        let buyer = db.seed_account("buyer@example.com", &[Role::Consumer]);
        let order = vnpay_order(&db, &buyer);
        let service = service(&db);

        let mut forged = ipn(&order, 8_000_000, "00");
        forged.insert("vnp_SecureHash".into(), "forged".into());
        assert_eq!(
            service.handle_ipn(&forged).await.unwrap(),
            IpnOutcome::InvalidSignature
        );

        let mut unknown = ipn(&order, 8_000_000, "00");
        unknown.insert("vnp_TxnRef".into(), Uuid::new_v4().to_string());
        assert_eq!(
            service.handle_ipn(&unknown).await.unwrap(),
            IpnOutcome::OrderNotFound
        );

        assert_eq!(
            service.handle_ipn(&ipn(&order, 80_000, "00")).await.unwrap(),
            IpnOutcome::InvalidAmount
        );

        assert_eq!(
            service.handle_ipn(&ipn(&order, 8_000_000, "24")).await.unwrap(),
            IpnOutcome::Failed
        );
        let state = service.payment_status(&buyer, order.id).await.unwrap();
        assert_eq!(state.payment_status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn payment_url_only_for_owner_of_pending_vnpay_order() {
        let db = MemoryDb::new();
        let buyer = db.seed_account("buyer@example.com", &[Role::Consumer]);
        let other = db.seed_account("other@example.com", &[Role::Consumer]);
        let order = vnpay_order(&db, &buyer);
        let service = service(&db);

        let url = service
            .create_payment_url(&buyer, order.id, "::1")
            .await
            .unwrap();
        assert!(url.contains(&order.id.to_string()));

        let err = service
            .create_payment_url(&other, order.id, "127.0.0.1")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = service.payment_status(&other, order.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn return_requires_valid_signature() {
        let db = MemoryDb::new();
        let buyer = db.seed_account("buyer@example.com", &[Role::Consumer]);
        let order = vnpay_order(&db, &buyer);
        let service = service(&db);

        let found = service
            .handle_return(&ipn(&order, 8_000_000, "00"))
            .await
            .unwrap();
        assert_eq!(found.id, order.id);
        assert_eq!(found.status, OrderStatus::Pending);

        let mut forged = ipn(&order, 8_000_000, "00");
        forged.remove("vnp_SecureHash");
        let err = service.handle_return(&forged).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
