//! Category Repository Port

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Category};

/// Repository interface for Category entities
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, DomainError>;

    async fn find_all(&self) -> Result<Vec<Category>, DomainError>;

    async fn insert(&self, category: &Category) -> Result<Category, DomainError>;

    /// Update name and parent of `category` and apply the new `levels` of
    /// its subtree in one transaction
    async fn update(
        &self,
        category: &Category,
        levels: &[(Uuid, i32)],
    ) -> Result<Category, DomainError>;

    /// Delete the given categories, returning how many went
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, DomainError>;
}
