//! Product - Item offered by a farmer
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::value_objects::{ProductSort, ProductStatus, Role};

pub const INITIAL_PRODUCT_RATING: f64 = 5.0;
/// Highest unit price a product may carry, in VND
pub const MAX_PRODUCT_PRICE: i64 = 1_000_000_000_000;

/// Product - prices are whole VND
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub inventory: i32,
    pub sold: i32,
    pub rating: f64,
    pub thumbnail: Option<String>,
    /// Sale unit label, e.g. "kg"
    pub unit_price: String,
    pub images: Vec<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Editable fields of a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub inventory: i32,
    pub thumbnail: Option<String>,
    pub unit_price: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if self.unit_price.trim().is_empty() {
            return Err(DomainError::validation("unit_price is required"));
        }
        if self.price <= 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        if self.price > MAX_PRODUCT_PRICE {
            return Err(DomainError::validation(format!(
                "price cannot exceed {}",
                MAX_PRODUCT_PRICE
            )));
        }
        if self.inventory < 0 {
            return Err(DomainError::validation("inventory cannot be negative"));
        }
        Ok(())
    }
}

impl Product {
    pub fn new(farmer_id: Uuid, draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            farmer_id,
            category_id: draft.category_id,
            name: draft.name.trim().to_string(),
            description: draft.description,
            price: draft.price,
            inventory: draft.inventory,
            sold: 0,
            rating: INITIAL_PRODUCT_RATING,
            thumbnail: draft.thumbnail,
            unit_price: draft.unit_price.trim().to_string(),
            images: reconcile_images(&[], &draft.images),
            status: ProductStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn apply(&mut self, draft: ProductDraft) {
        self.category_id = draft.category_id;
        self.name = draft.name.trim().to_string();
        self.description = draft.description;
        self.price = draft.price;
        self.inventory = draft.inventory;
        self.thumbnail = draft.thumbnail;
        self.unit_price = draft.unit_price.trim().to_string();
        self.images = reconcile_images(&self.images, &draft.images);
        self.updated_at = Utc::now();
    }

    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.status = ProductStatus::Deleted;
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        self.status == ProductStatus::Deleted
    }

    /// Whether a caller holding `roles` may look at this product
    pub fn visible_to(&self, roles: &[Role]) -> bool {
        if roles.contains(&Role::Admin) {
            return true;
        }
        if roles.contains(&Role::Farmer) {
            return !self.is_deleted();
        }
        self.status == ProductStatus::Active
    }
}

/// Existing paths keep their order, new ones are appended, absent ones dropped.
pub fn reconcile_images(existing: &[String], requested: &[String]) -> Vec<String> {
    let mut wanted: Vec<&String> = Vec::new();
    for path in requested {
        if !path.trim().is_empty() && !wanted.contains(&path) {
            wanted.push(path);
        }
    }

    let mut result: Vec<String> = existing
        .iter()
        .filter(|path| wanted.contains(path))
        .cloned()
        .collect();
    for path in wanted {
        if !result.contains(path) {
            result.push(path.clone());
        }
    }
    result
}

/// Public catalogue query
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Category to match, descendants included
    pub category_id: Option<Uuid>,
    pub keyword: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort: ProductSort,
}

/// Id and name of a listed product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductName {
    pub id: Uuid,
    pub name: String,
}

/// Product fields shown next to carts, orders and market prices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub name: String,
    pub price: i64,
    pub thumbnail: Option<String>,
    pub unit_price: String,
    pub inventory: i32,
    pub status: ProductStatus,
}

impl From<&Product> for ProductSummary {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            farmer_id: p.farmer_id,
            name: p.name.clone(),
            price: p.price,
            thumbnail: p.thumbnail.clone(),
            unit_price: p.unit_price.clone(),
            inventory: p.inventory,
            status: p.status,
        }
    }
}
