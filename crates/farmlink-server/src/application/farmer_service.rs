//! Farmer Application Service (Use Case)
//!
//! Seller profiles: upgrading an account, profile edits, blocking and the
//! farm's pickup address.

use std::sync::Arc;
use uuid::Uuid;

use farmlink::{Actor, DomainError, Farmer, FarmerRepository, FarmerStatus, PostalAddress, Role};

/// Patch for a farmer profile; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct FarmerUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
}

pub struct FarmerService<F: FarmerRepository> {
    farmers: Arc<F>,
}

impl<F: FarmerRepository> FarmerService<F> {
    pub fn new(farmers: Arc<F>) -> Self {
        Self { farmers }
    }

    /// Grant the FARMER role and create the profile in one step.
    ///
    /// The caller's tokens still carry the old roles; issue new ones after.
    pub async fn upgrade_to_farmer(&self, actor: &Actor, name: &str) -> Result<Farmer, DomainError> {
        if actor.has_role(Role::Farmer) {
            return Err(DomainError::conflict("account is already a farmer"));
        }
        let name = required_name(name)?;

        let farmer = self
            .farmers
            .create_for_account(&Farmer::new(actor.account_id, name))
            .await?;

        tracing::info!("Account {} became farmer {}", actor.account_id, farmer.id);
        Ok(farmer)
    }

    pub async fn get(&self, id: Uuid) -> Result<Farmer, DomainError> {
        self.farmers
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Farmer", id))
    }

    pub async fn get_mine(&self, actor: &Actor) -> Result<Farmer, DomainError> {
        actor.require_role(Role::Farmer)?;
        self.farmers
            .find_by_account(actor.account_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Farmer", actor.account_id))
    }

    pub async fn list_all(&self, actor: &Actor) -> Result<Vec<Farmer>, DomainError> {
        actor.require_role(Role::Admin)?;
        self.farmers.find_all().await
    }

    pub async fn update_info(
        &self,
        actor: &Actor,
        update: FarmerUpdate,
    ) -> Result<Farmer, DomainError> {
        let mut farmer = self.get_mine(actor).await?;

        if let Some(name) = update.name {
            farmer.name = required_name(&name)?;
        }
        if update.avatar.is_some() {
            farmer.avatar = update.avatar;
        }
        if update.cover_image.is_some() {
            farmer.cover_image = update.cover_image;
        }
        if update.description.is_some() {
            farmer.description = update.description;
        }
        farmer.updated_at = chrono::Utc::now();

        self.farmers.save(&farmer).await
    }

    /// Administrators toggle ACTIVE / ADMIN_BLOCK; the owner toggles
    /// ACTIVE / SELF_BLOCK but cannot lift an administrator's block.
    pub async fn change_status(
        &self,
        actor: &Actor,
        farmer_id: Uuid,
        status: FarmerStatus,
    ) -> Result<Farmer, DomainError> {
        let mut farmer = self.get(farmer_id).await?;
        let is_owner = farmer.account_id == actor.account_id;

        match status {
            FarmerStatus::AdminBlock => actor.require_role(Role::Admin)?,
            FarmerStatus::SelfBlock => {
                if !is_owner {
                    return Err(DomainError::forbidden("only the owner can pause a farm"));
                }
            }
            FarmerStatus::Active => {
                if !actor.is_admin() {
                    if !is_owner {
                        return Err(DomainError::forbidden("farm belongs to another account"));
                    }
                    if farmer.status == FarmerStatus::AdminBlock {
                        return Err(DomainError::forbidden(
                            "farm was blocked by an administrator",
                        ));
                    }
                }
            }
        }

        farmer.status = status;
        farmer.updated_at = chrono::Utc::now();
        let saved = self.farmers.save(&farmer).await?;

        tracing::info!("Farmer {} status set to {}", saved.id, saved.status);
        Ok(saved)
    }

    pub async fn create_address(
        &self,
        actor: &Actor,
        postal: PostalAddress,
    ) -> Result<Farmer, DomainError> {
        let mut farmer = self.get_mine(actor).await?;
        if farmer.address.is_some() {
            return Err(DomainError::conflict("farm address already exists"));
        }
        farmer.address = Some(postal.normalized()?);
        farmer.updated_at = chrono::Utc::now();
        self.farmers.save(&farmer).await
    }

    pub async fn update_address(
        &self,
        actor: &Actor,
        postal: PostalAddress,
    ) -> Result<Farmer, DomainError> {
        let mut farmer = self.get_mine(actor).await?;
        if farmer.address.is_none() {
            return Err(DomainError::not_found("FarmAddress", farmer.id));
        }
        farmer.address = Some(postal.normalized()?);
        farmer.updated_at = chrono::Utc::now();
        self.farmers.save(&farmer).await
    }

    pub async fn delete_address(&self, actor: &Actor) -> Result<Farmer, DomainError> {
        let mut farmer = self.get_mine(actor).await?;
        if farmer.address.take().is_none() {
            return Err(DomainError::not_found("FarmAddress", farmer.id));
        }
        farmer.updated_at = chrono::Utc::now();
        self.farmers.save(&farmer).await
    }
}

fn required_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("farm name is required"));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{postal, MemoryDb};

    #[tokio::test]
    async fn upgrade_grants_role_once() {
        let db = MemoryDb::new();
        let actor = db.seed_account("lan@example.com", &[Role::Consumer]);
        let service = FarmerService::new(db.clone());

        let farmer = service
            .upgrade_to_farmer(&actor, "  Vườn Lan ")
            .await
            .unwrap();
        assert_eq!(farmer.name, "Vườn Lan");
        assert!(db.account(actor.account_id).has_role(Role::Farmer));

        // stale token still says CONSUMER only; the repository catches it
        let err = service
            .upgrade_to_farmer(&actor, "Vườn Lan 2")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn owner_cannot_lift_admin_block() {
        let db = MemoryDb::new();
        let owner = db.seed_account("farm@example.com", &[Role::Consumer, Role::Farmer]);
        let admin = db.seed_account("admin@example.com", &[Role::Admin]);
        let farmer_id = owner.farmer_id.unwrap();
        let service = FarmerService::new(db.clone());

        service
            .change_status(&owner, farmer_id, FarmerStatus::SelfBlock)
            .await
            .unwrap();
        service
            .change_status(&owner, farmer_id, FarmerStatus::Active)
            .await
            .unwrap();

        service
            .change_status(&admin, farmer_id, FarmerStatus::AdminBlock)
            .await
            .unwrap();
        let err = service
            .change_status(&owner, farmer_id, FarmerStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = service
            .change_status(&owner, farmer_id, FarmerStatus::AdminBlock)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let lifted = service
            .change_status(&admin, farmer_id, FarmerStatus::Active)
            .await
            .unwrap();
        assert!(lifted.is_active());
    }

    #[tokio::test]
    async fn farm_address_lifecycle() {
        let db = MemoryDb::new();
        let owner = db.seed_account("farm@example.com", &[Role::Consumer, Role::Farmer]);
        let service = FarmerService::new(db.clone());

        let err = service.update_address(&owner, postal()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        service.create_address(&owner, postal()).await.unwrap();
        let err = service.create_address(&owner, postal()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let cleared = service.delete_address(&owner).await.unwrap();
        assert!(cleared.address.is_none());
        let err = service.delete_address(&owner).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_on_update() {
        let db = MemoryDb::new();
        let owner = db.seed_account("farm@example.com", &[Role::Consumer, Role::Farmer]);
        let service = FarmerService::new(db.clone());

        let err = service
            .update_info(
                &owner,
                FarmerUpdate {
                    name: Some("  ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
