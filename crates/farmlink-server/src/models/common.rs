//! Shared DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use farmlink::PostalAddress;

/// Delivery destination (province / district / ward are stored verbatim)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostalAddressDto {
    pub receiver_name: String,
    /// `0` + 9 digits or `+84` + 9 digits; spaces, dots and dashes ignored
    pub receiver_phone: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub detail: String,
}

impl From<PostalAddress> for PostalAddressDto {
    fn from(p: PostalAddress) -> Self {
        Self {
            receiver_name: p.receiver_name,
            receiver_phone: p.receiver_phone,
            province: p.province,
            district: p.district,
            ward: p.ward,
            detail: p.detail,
        }
    }
}

impl From<PostalAddressDto> for PostalAddress {
    fn from(p: PostalAddressDto) -> Self {
        Self {
            receiver_name: p.receiver_name,
            receiver_phone: p.receiver_phone,
            province: p.province,
            district: p.district,
            ward: p.ward,
            detail: p.detail,
        }
    }
}

/// Generic acknowledgement for operations without a body
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
