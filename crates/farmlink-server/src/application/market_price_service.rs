//! Market Price Application Service (Use Case)

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use farmlink::{
    Actor, DomainError, MarketPrice, MarketPriceRepository, ProductRepository, ProductSummary,
    Role,
};

/// Market price with the product it was observed for
#[derive(Debug, Clone, Serialize)]
pub struct MarketPriceView {
    #[serde(flatten)]
    pub price: MarketPrice,
    pub product: Option<ProductSummary>,
}

/// Patch for a market price; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct MarketPricePatch {
    pub product_id: Option<Uuid>,
    pub price: Option<i64>,
    pub region: Option<String>,
    pub date_recorded: Option<NaiveDate>,
}

pub struct MarketPriceService<M: MarketPriceRepository, P: ProductRepository> {
    prices: Arc<M>,
    products: Arc<P>,
}

impl<M: MarketPriceRepository, P: ProductRepository> MarketPriceService<M, P> {
    pub fn new(prices: Arc<M>, products: Arc<P>) -> Self {
        Self { prices, products }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        product_id: Uuid,
        price: i64,
        region: &str,
        date_recorded: NaiveDate,
    ) -> Result<MarketPriceView, DomainError> {
        actor.require_role(Role::Admin)?;
        self.ensure_product(product_id).await?;

        let record = MarketPrice::new(product_id, price, region, date_recorded)?;
        let saved = self.prices.save(&record).await?;

        tracing::info!("Recorded market price {} for product {}", saved.id, product_id);
        self.view(saved).await
    }

    pub async fn get(&self, id: Uuid) -> Result<MarketPriceView, DomainError> {
        let record = self.find(id).await?;
        self.view(record).await
    }

    /// All prices, or those of one product, oldest observation first
    pub async fn list(&self, product_id: Option<Uuid>) -> Result<Vec<MarketPriceView>, DomainError> {
        let records = self.prices.find_all(product_id).await?;

        let mut ids: Vec<Uuid> = records.iter().map(|r| r.product_id).collect();
        ids.sort();
        ids.dedup();
        let products: HashMap<Uuid, ProductSummary> = self
            .products
            .find_many(&ids)
            .await?
            .iter()
            .map(|p| (p.id, ProductSummary::from(p)))
            .collect();

        Ok(records
            .into_iter()
            .map(|price| MarketPriceView {
                product: products.get(&price.product_id).cloned(),
                price,
            })
            .collect())
    }

    pub async fn patch(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: MarketPricePatch,
    ) -> Result<MarketPriceView, DomainError> {
        actor.require_role(Role::Admin)?;
        let mut record = self.find(id).await?;

        if let Some(product_id) = patch.product_id {
            self.ensure_product(product_id).await?;
            record.product_id = product_id;
        }
        if let Some(price) = patch.price {
            record.price = price;
        }
        if let Some(region) = patch.region {
            record.region = region.trim().to_string();
        }
        if let Some(date) = patch.date_recorded {
            record.date_recorded = date;
        }
        record.validate()?;

        let saved = self.prices.save(&record).await?;
        self.view(saved).await
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        actor.require_role(Role::Admin)?;
        if !self.prices.delete(id).await? {
            return Err(DomainError::not_found("MarketPrice", id));
        }
        tracing::info!("Deleted market price {}", id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<MarketPrice, DomainError> {
        self.prices
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("MarketPrice", id))
    }

    async fn ensure_product(&self, id: Uuid) -> Result<(), DomainError> {
        match self.products.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Product", id)),
        }
    }

    async fn view(&self, price: MarketPrice) -> Result<MarketPriceView, DomainError> {
        let product = self
            .products
            .find_by_id(price.product_id)
            .await?
            .map(|p| ProductSummary::from(&p));
        Ok(MarketPriceView { price, product })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryDb;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[tokio::test]
    async fn list_is_ordered_by_date_with_product_summary() {
        let db = MemoryDb::new();
        let admin = db.seed_account("admin@example.com", &[Role::Admin]);
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let veg = db.seed_category("Rau củ", None);
        let product = db.seed_product(farmer.farmer_id.unwrap(), veg.id, 10_000, 3);
        let service = MarketPriceService::new(db.clone(), db.clone());

        service
            .create(&admin, product.id, 12_000, "Hà Nội", day(9))
            .await
            .unwrap();
        service
            .create(&admin, product.id, 11_000, " Đà Lạt ", day(2))
            .await
            .unwrap();

        let list = service.list(Some(product.id)).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].price.date_recorded, day(2));
        assert_eq!(list[0].price.region, "Đà Lạt");
        assert_eq!(list[0].product.as_ref().unwrap().id, product.id);
    }

    #[tokio::test]
    async fn create_validates_product_and_values() {
        let db = MemoryDb::new();
        let admin = db.seed_account("admin@example.com", &[Role::Admin]);
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let veg = db.seed_category("Rau củ", None);
        let product = db.seed_product(farmer.farmer_id.unwrap(), veg.id, 10_000, 3);
        let service = MarketPriceService::new(db.clone(), db.clone());

        let err = service
            .create(&admin, Uuid::new_v4(), 1_000, "Huế", day(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = service
            .create(&admin, product.id, 0, "Huế", day(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service
            .create(&farmer, product.id, 1_000, "Huế", day(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn patch_keeps_unspecified_fields() {
        let db = MemoryDb::new();
        let admin = db.seed_account("admin@example.com", &[Role::Admin]);
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let veg = db.seed_category("Rau củ", None);
        let product = db.seed_product(farmer.farmer_id.unwrap(), veg.id, 10_000, 3);
        let service = MarketPriceService::new(db.clone(), db.clone());

        let created = service
            .create(&admin, product.id, 12_000, "Hà Nội", day(9))
            .await
            .unwrap();
        let patched = service
            .patch(
                &admin,
                created.price.id,
                MarketPricePatch {
                    price: Some(13_500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.price.price, 13_500);
        assert_eq!(patched.price.region, "Hà Nội");

        let err = service
            .patch(
                &admin,
                created.price.id,
                MarketPricePatch {
                    region: Some(" ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        service.delete(&admin, created.price.id).await.unwrap();
        assert!(service.get(created.price.id).await.is_err());
    }
}
