//! MarketPrice - Observed regional price of a product

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPrice {
    pub id: Uuid,
    pub product_id: Uuid,
    pub price: i64,
    pub region: String,
    pub date_recorded: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl MarketPrice {
    pub fn new(
        product_id: Uuid,
        price: i64,
        region: &str,
        date_recorded: NaiveDate,
    ) -> Result<Self, DomainError> {
        let record = Self {
            id: Uuid::new_v4(),
            product_id,
            price,
            region: region.trim().to_string(),
            date_recorded,
            created_at: Utc::now(),
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.price <= 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        if self.region.trim().is_empty() {
            return Err(DomainError::validation("region is required"));
        }
        Ok(())
    }
}
