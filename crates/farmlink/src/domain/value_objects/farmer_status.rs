//! FarmerStatus - Whether a farm may sell

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FarmerStatus {
    #[default]
    Active,
    /// Paused by the farmer
    SelfBlock,
    /// Suspended by an administrator
    AdminBlock,
}

impl std::fmt::Display for FarmerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FarmerStatus::Active => write!(f, "ACTIVE"),
            FarmerStatus::SelfBlock => write!(f, "SELF_BLOCK"),
            FarmerStatus::AdminBlock => write!(f, "ADMIN_BLOCK"),
        }
    }
}

impl std::str::FromStr for FarmerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(FarmerStatus::Active),
            "SELF_BLOCK" => Ok(FarmerStatus::SelfBlock),
            "ADMIN_BLOCK" => Ok(FarmerStatus::AdminBlock),
            _ => Err(format!("Unknown farmer status: {}", s)),
        }
    }
}
