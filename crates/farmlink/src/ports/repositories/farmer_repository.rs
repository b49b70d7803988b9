//! Farmer Repository Port
//!
//! Abstract interface for Farmer persistence operations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Farmer};

/// Repository interface for Farmer entities
#[async_trait]
pub trait FarmerRepository: Send + Sync {
    /// Find a farmer by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Farmer>, DomainError>;

    /// Find the farmer profile owned by an account
    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Farmer>, DomainError>;

    /// Find all farmers, newest first
    async fn find_all(&self) -> Result<Vec<Farmer>, DomainError>;

    /// Insert the profile and grant the FARMER role to its account atomically
    async fn create_for_account(&self, farmer: &Farmer) -> Result<Farmer, DomainError>;

    /// Update an existing farmer
    async fn save(&self, farmer: &Farmer) -> Result<Farmer, DomainError>;

    /// Number of farmers
    async fn count(&self) -> Result<i64, DomainError>;
}
