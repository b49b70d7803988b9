//! Product Repository Port
//!
//! Abstract interface for Product persistence operations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::DomainError, Page, PageRequest, Product, ProductName, ProductQuery, ProductStatus,
};

/// Repository interface for Product entities
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find a product by ID, whatever its status
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;

    /// Products by ID, in no particular order
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;

    /// Save a product (insert or update)
    async fn save(&self, product: &Product) -> Result<Product, DomainError>;

    /// Public catalogue: ACTIVE products of ACTIVE farmers matching `query`.
    /// `category_ids` replaces `query.category_id` with the resolved subtree.
    async fn search(
        &self,
        query: &ProductQuery,
        category_ids: Option<&[Uuid]>,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError>;

    /// Products of a farmer that are not DELETED, newest first
    async fn find_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<Product>, DomainError>;

    /// All products, newest first
    async fn find_all(&self) -> Result<Vec<Product>, DomainError>;

    /// Id and name of every ACTIVE product, sorted by name
    async fn find_names(&self) -> Result<Vec<ProductName>, DomainError>;

    /// Whether any product, deleted or not, references one of the categories
    async fn exists_in_categories(&self, category_ids: &[Uuid]) -> Result<bool, DomainError>;

    /// Product counts per status
    async fn count_by_status(&self) -> Result<Vec<(ProductStatus, i64)>, DomainError>;
}
