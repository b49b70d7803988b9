//! Address Application Service (Use Case)
//!
//! Saved delivery addresses. An account with addresses always has exactly
//! one default.

use std::sync::Arc;
use uuid::Uuid;

use farmlink::{Actor, Address, AddressRepository, DomainError, PostalAddress};

pub struct AddressService<D: AddressRepository> {
    addresses: Arc<D>,
}

impl<D: AddressRepository> AddressService<D> {
    pub fn new(addresses: Arc<D>) -> Self {
        Self { addresses }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        postal: PostalAddress,
        is_default: Option<bool>,
    ) -> Result<Address, DomainError> {
        let postal = postal.normalized()?;
        let first = self
            .addresses
            .find_by_account(actor.account_id)
            .await?
            .is_empty();

        let address = Address::new(
            actor.account_id,
            postal,
            first || is_default.unwrap_or(false),
        );
        let saved = self.addresses.insert(&address).await?;

        tracing::info!("Created address {} for {}", saved.id, actor.account_id);
        Ok(saved)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Address, DomainError> {
        let address = self
            .addresses
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Address", id))?;
        if address.account_id != actor.account_id {
            return Err(DomainError::forbidden("address belongs to another account"));
        }
        Ok(address)
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<Address>, DomainError> {
        self.addresses.find_by_account(actor.account_id).await
    }

    /// Replace the postal fields. `Some(true)` promotes the address; clearing
    /// the flag on the current default is ignored.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        postal: PostalAddress,
        is_default: Option<bool>,
    ) -> Result<Address, DomainError> {
        let mut address = self.get(actor, id).await?;
        address.postal = postal.normalized()?;
        address.is_default = address.is_default || is_default == Some(true);
        address.updated_at = chrono::Utc::now();

        self.addresses.update(&address).await
    }

    pub async fn set_default(&self, actor: &Actor, id: Uuid) -> Result<Address, DomainError> {
        self.get(actor, id).await?;
        self.addresses.set_default(actor.account_id, id).await?;

        tracing::info!("Default address of {} is now {}", actor.account_id, id);
        self.get(actor, id).await
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        self.get(actor, id).await?;
        if !self.addresses.delete(actor.account_id, id).await? {
            return Err(DomainError::not_found("Address", id));
        }
        tracing::info!("Deleted address {}", id);
        Ok(())
    }
}
