//! Notification preferences per delivery channel

use serde::{Deserialize, Serialize};

/// Which kinds of notifications a channel delivers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelSettings {
    pub order: bool,
    pub promotion: bool,
    pub shipping: bool,
    pub system: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationSettings {
    pub email: ChannelSettings,
    pub push: ChannelSettings,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: ChannelSettings {
                order: true,
                promotion: true,
                shipping: true,
                system: false,
            },
            push: ChannelSettings {
                order: true,
                promotion: false,
                shipping: true,
                system: true,
            },
        }
    }
}
