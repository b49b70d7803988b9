//! Address DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use farmlink::Address;

use super::PostalAddressDto;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddressRequest {
    #[serde(flatten)]
    pub postal: PostalAddressDto,
    /// `true` makes this the default address
    pub is_default: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub postal: PostalAddressDto,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Address> for AddressResponse {
    fn from(a: Address) -> Self {
        Self {
            id: a.id,
            postal: a.postal.into(),
            is_default: a.is_default,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}
