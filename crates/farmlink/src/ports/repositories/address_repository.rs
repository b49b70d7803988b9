//! Address Repository Port
//!
//! Implementations keep at most one default address per account; every
//! write that touches the default flag runs in one transaction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Address};

/// Repository interface for Address entities
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Find an address by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Address>, DomainError>;

    /// Addresses of an account, default first then newest first
    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<Address>, DomainError>;

    /// Insert an address; when it is the default, the previous default is demoted
    async fn insert(&self, address: &Address) -> Result<Address, DomainError>;

    /// Update an address; when it is the default, the previous default is demoted
    async fn update(&self, address: &Address) -> Result<Address, DomainError>;

    /// Make `id` the only default address of `account_id`
    async fn set_default(&self, account_id: Uuid, id: Uuid) -> Result<(), DomainError>;

    /// Delete an address; if it was the default, the newest remaining one is promoted
    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool, DomainError>;
}
