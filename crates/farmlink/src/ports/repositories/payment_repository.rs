//! Payment Repository Port

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Payment};

/// Repository interface for Payment records
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Store a successful payment and mark its order PAID in one
    /// transaction, or REFUNDED when the order was canceled meanwhile.
    /// Returns false when the order was already paid or refunded.
    async fn record_success(&self, payment: &Payment) -> Result<bool, DomainError>;

    /// Latest payment recorded for an order
    async fn find_by_order(&self, order_id: Uuid) -> Result<Option<Payment>, DomainError>;
}
