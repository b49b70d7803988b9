//! Account DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use farmlink::{Account, ChannelSettings, NotificationSettings, Role};

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    #[schema(value_type = Vec<String>)]
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            display_name: a.display_name,
            phone: a.phone,
            avatar: a.avatar,
            roles: a.roles,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ChannelSettingsDto {
    pub order: bool,
    pub promotion: bool,
    pub shipping: bool,
    pub system: bool,
}

/// Notification preferences; updates replace the whole document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct NotificationSettingsDto {
    pub email: ChannelSettingsDto,
    pub push: ChannelSettingsDto,
}

impl From<ChannelSettings> for ChannelSettingsDto {
    fn from(c: ChannelSettings) -> Self {
        Self {
            order: c.order,
            promotion: c.promotion,
            shipping: c.shipping,
            system: c.system,
        }
    }
}

impl From<ChannelSettingsDto> for ChannelSettings {
    fn from(c: ChannelSettingsDto) -> Self {
        Self {
            order: c.order,
            promotion: c.promotion,
            shipping: c.shipping,
            system: c.system,
        }
    }
}

impl From<NotificationSettings> for NotificationSettingsDto {
    fn from(s: NotificationSettings) -> Self {
        Self {
            email: s.email.into(),
            push: s.push.into(),
        }
    }
}

impl From<NotificationSettingsDto> for NotificationSettings {
    fn from(s: NotificationSettingsDto) -> Self {
        Self {
            email: s.email.into(),
            push: s.push.into(),
        }
    }
}
