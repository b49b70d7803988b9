//! MarketPrice Repository Port

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, MarketPrice};

/// Repository interface for MarketPrice entities
#[async_trait]
pub trait MarketPriceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MarketPrice>, DomainError>;

    /// Records, optionally of one product, oldest `date_recorded` first
    async fn find_all(&self, product_id: Option<Uuid>) -> Result<Vec<MarketPrice>, DomainError>;

    /// Save a record (insert or update)
    async fn save(&self, price: &MarketPrice) -> Result<MarketPrice, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
