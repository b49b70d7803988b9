//! Farmer DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use farmlink::{Farmer, FarmerStatus};

use super::{PostalAddressDto, TokenResponse};

#[derive(Debug, Serialize, ToSchema)]
pub struct FarmerResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub rating: f64,
    #[schema(value_type = String, example = "ACTIVE")]
    pub status: FarmerStatus,
    pub address: Option<PostalAddressDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Farmer> for FarmerResponse {
    fn from(f: Farmer) -> Self {
        Self {
            id: f.id,
            account_id: f.account_id,
            name: f.name,
            avatar: f.avatar,
            cover_image: f.cover_image,
            description: f.description,
            rating: f.rating,
            status: f.status,
            address: f.address.map(Into::into),
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpgradeFarmerRequest {
    pub name: String,
}

/// New farmer profile plus tokens carrying the FARMER role
#[derive(Debug, Serialize, ToSchema)]
pub struct UpgradeFarmerResponse {
    pub farmer: FarmerResponse,
    pub tokens: TokenResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFarmerRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FarmerStatusRequest {
    #[schema(value_type = String, example = "SELF_BLOCK")]
    pub status: FarmerStatus,
}
