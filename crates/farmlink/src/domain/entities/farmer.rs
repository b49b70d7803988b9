//! Farmer - Seller profile attached to an account
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::value_objects::{FarmerStatus, PostalAddress};

pub const INITIAL_RATING: f64 = 5.0;

/// Farmer - a farm or shop selling through the marketplace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farmer {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub rating: f64,
    pub status: FarmerStatus,
    /// Farm location, at most one per farmer
    pub address: Option<PostalAddress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Farmer {
    pub fn new(account_id: Uuid, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            name,
            avatar: None,
            cover_image: None,
            description: None,
            rating: INITIAL_RATING,
            status: FarmerStatus::Active,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == FarmerStatus::Active
    }

    /// Fails unless the farmer may sell
    pub fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!(
                "farmer {} is {}",
                self.id, self.status
            )))
        }
    }
}
