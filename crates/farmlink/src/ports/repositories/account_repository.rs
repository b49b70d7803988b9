//! Account Repository Port
//!
//! Abstract interface for Account persistence operations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Account};

/// Repository interface for Account entities
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, DomainError>;

    /// Find an account by its normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Find all accounts, newest first
    async fn find_all(&self) -> Result<Vec<Account>, DomainError>;

    /// Save an account (insert or update). A taken email is a Conflict.
    async fn save(&self, account: &Account) -> Result<Account, DomainError>;

    /// Replace (or clear) the stored refresh token
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), DomainError>;

    /// Delete an account by ID
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Number of accounts
    async fn count(&self) -> Result<i64, DomainError>;
}
