//! Ocop Repository Port

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Ocop, OcopStatus};

/// Repository interface for OCOP certifications, keyed by product
#[async_trait]
pub trait OcopRepository: Send + Sync {
    async fn find_by_product(&self, product_id: Uuid) -> Result<Option<Ocop>, DomainError>;

    /// Certifications, optionally of one status, most recently changed first
    async fn find_all(&self, status: Option<OcopStatus>) -> Result<Vec<Ocop>, DomainError>;

    /// First submission for a product; Conflict if it already has one
    async fn insert(&self, ocop: &Ocop) -> Result<Ocop, DomainError>;

    /// Overwrite the stored certification if its status is still
    /// `expected`; Conflict otherwise
    async fn update(&self, ocop: &Ocop, expected: OcopStatus) -> Result<Ocop, DomainError>;
}
