//! Order Repository Port
//!
//! Order writes that touch product stock are single transactions.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::services::TransitionPlan;
use crate::domain::{errors::DomainError, Order, OrderStatus, PaymentStatus};

/// Repository interface for Order entities
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Find an order by ID, items and history included
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;

    /// Orders placed by an account, newest first
    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<Order>, DomainError>;

    /// Orders received by a farmer, newest first
    async fn find_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<Order>, DomainError>;

    /// All orders, optionally of one status, newest first
    async fn find_all(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, DomainError>;

    /// Insert the order, take its quantities out of inventory and delete the
    /// consumed cart items. Stock that no longer covers an item, or a cart
    /// item that is already gone, is a Conflict and nothing is written.
    async fn place(&self, order: &Order, cart_item_ids: &[Uuid]) -> Result<Order, DomainError>;

    /// Persist the status change `plan` made on `order`, together with its
    /// stock effects. The stored order and payment statuses must still be
    /// `plan.from` and `plan.from_payment`; otherwise nothing is written and
    /// the result is a Conflict.
    async fn apply_transition(
        &self,
        order: &Order,
        plan: &TransitionPlan,
    ) -> Result<Order, DomainError>;

    /// Set the payment status if it still equals `expected`
    async fn update_payment_status(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        status: PaymentStatus,
    ) -> Result<bool, DomainError>;

    /// `(status, order count, summed total price)` over all orders
    async fn totals_by_status(&self) -> Result<Vec<(OrderStatus, i64, i64)>, DomainError>;
}
