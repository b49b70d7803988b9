//! Actor - The authenticated caller of a use case

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;
use crate::domain::errors::DomainError;

/// Identity and roles of the caller, as carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub account_id: Uuid,
    pub roles: Vec<Role>,
    pub farmer_id: Option<Uuid>,
}

impl Actor {
    pub fn new(account_id: Uuid, roles: Vec<Role>, farmer_id: Option<Uuid>) -> Self {
        Self {
            account_id,
            roles,
            farmer_id,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn require_role(&self, role: Role) -> Result<(), DomainError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!("{} role required", role)))
        }
    }

    /// Farmer profile id of the caller
    pub fn require_farmer(&self) -> Result<Uuid, DomainError> {
        match (self.has_role(Role::Farmer), self.farmer_id) {
            (true, Some(id)) => Ok(id),
            _ => Err(DomainError::forbidden("FARMER role required")),
        }
    }
}
