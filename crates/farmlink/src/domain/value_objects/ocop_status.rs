//! OcopStatus - Review state of an OCOP certification

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OcopStatus {
    /// Submitted by the farmer, waiting for an administrator
    #[default]
    PendingVerify,
    Verified,
    Rejected,
}

impl std::fmt::Display for OcopStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcopStatus::PendingVerify => write!(f, "PENDING_VERIFY"),
            OcopStatus::Verified => write!(f, "VERIFIED"),
            OcopStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl std::str::FromStr for OcopStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING_VERIFY" => Ok(OcopStatus::PendingVerify),
            "VERIFIED" => Ok(OcopStatus::Verified),
            "REJECTED" => Ok(OcopStatus::Rejected),
            _ => Err(format!("Unknown OCOP status: {}", s)),
        }
    }
}
