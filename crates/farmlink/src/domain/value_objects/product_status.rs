//! ProductStatus - Catalogue visibility of a product

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    /// Blocked by an administrator
    Blocked,
    /// Soft-deleted by its farmer
    Deleted,
    /// Awaiting review
    Pending,
    /// Rejected by an administrator
    Rejected,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 5] = [
        ProductStatus::Active,
        ProductStatus::Blocked,
        ProductStatus::Deleted,
        ProductStatus::Pending,
        ProductStatus::Rejected,
    ];

    /// Statuses an administrator may assign
    pub fn is_admin_assignable(&self) -> bool {
        matches!(
            self,
            ProductStatus::Active | ProductStatus::Rejected | ProductStatus::Blocked
        )
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Active => write!(f, "ACTIVE"),
            ProductStatus::Blocked => write!(f, "BLOCKED"),
            ProductStatus::Deleted => write!(f, "DELETED"),
            ProductStatus::Pending => write!(f, "PENDING"),
            ProductStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(ProductStatus::Active),
            "BLOCKED" => Ok(ProductStatus::Blocked),
            "DELETED" => Ok(ProductStatus::Deleted),
            "PENDING" => Ok(ProductStatus::Pending),
            "REJECTED" => Ok(ProductStatus::Rejected),
            _ => Err(format!("Unknown product status: {}", s)),
        }
    }
}

/// Catalogue sort order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Rating,
    PriceAsc,
    PriceDesc,
    Newest,
    BestSelling,
}

impl std::fmt::Display for ProductSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductSort::Rating => write!(f, "rating"),
            ProductSort::PriceAsc => write!(f, "price_asc"),
            ProductSort::PriceDesc => write!(f, "price_desc"),
            ProductSort::Newest => write!(f, "newest"),
            ProductSort::BestSelling => write!(f, "best_selling"),
        }
    }
}

impl std::str::FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rating" => Ok(ProductSort::Rating),
            "price_asc" => Ok(ProductSort::PriceAsc),
            "price_desc" => Ok(ProductSort::PriceDesc),
            "newest" => Ok(ProductSort::Newest),
            "best_selling" => Ok(ProductSort::BestSelling),
            _ => Err(format!("Unknown sort: {}", s)),
        }
    }
}
