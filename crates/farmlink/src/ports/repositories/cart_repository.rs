//! Cart Repository Port

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, CartItem, CartLine};

/// Repository interface for CartItem entities
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CartItem>, DomainError>;

    /// Insert `item`, or grow the account's existing line for the same
    /// product by `item.quantity` (saturating). Returns the stored line.
    async fn merge(&self, item: &CartItem) -> Result<CartItem, DomainError>;

    /// Cart items by ID, in no particular order
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<CartItem>, DomainError>;

    /// Cart of an account with product summaries, newest first
    async fn find_lines(&self, account_id: Uuid) -> Result<Vec<CartLine>, DomainError>;

    /// Save a cart item (insert or update)
    async fn save(&self, item: &CartItem) -> Result<CartItem, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Remove every cart item of an account, returning how many went
    async fn clear(&self, account_id: Uuid) -> Result<u64, DomainError>;
}
