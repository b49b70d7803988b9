//! Statistics Application Service (Use Case)
//!
//! Dashboards for farmers and administrators.

use std::sync::Arc;

use chrono::{FixedOffset, Utc};

use farmlink::domain::services::{admin_overview, farmer_dashboard, AdminOverview, FarmerDashboard};
use farmlink::{
    AccountRepository, Actor, DomainError, FarmerRepository, OrderRepository, ProductRepository,
    Role,
};

pub struct StatisticsService<O, P, A, F>
where
    O: OrderRepository,
    P: ProductRepository,
    A: AccountRepository,
    F: FarmerRepository,
{
    orders: Arc<O>,
    products: Arc<P>,
    accounts: Arc<A>,
    farmers: Arc<F>,
    /// Calendar boundaries (today, week, month) are taken in this offset
    offset: FixedOffset,
}

impl<O, P, A, F> StatisticsService<O, P, A, F>
where
    O: OrderRepository,
    P: ProductRepository,
    A: AccountRepository,
    F: FarmerRepository,
{
    pub fn new(
        orders: Arc<O>,
        products: Arc<P>,
        accounts: Arc<A>,
        farmers: Arc<F>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            orders,
            products,
            accounts,
            farmers,
            offset,
        }
    }

    pub async fn farmer_dashboard(&self, actor: &Actor) -> Result<FarmerDashboard, DomainError> {
        let farmer_id = actor.require_farmer()?;
        let orders = self.orders.find_by_farmer(farmer_id).await?;
        let product_count = self.products.find_by_farmer(farmer_id).await?.len() as i64;

        Ok(farmer_dashboard(
            &orders,
            product_count,
            Utc::now().with_timezone(&self.offset),
        ))
    }

    pub async fn admin_overview(&self, actor: &Actor) -> Result<AdminOverview, DomainError> {
        actor.require_role(Role::Admin)?;

        let accounts = self.accounts.count().await?;
        let farmers = self.farmers.count().await?;
        let products = self.products.count_by_status().await?;
        let orders = self.orders.totals_by_status().await?;

        Ok(admin_overview(accounts, farmers, &products, &orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{postal, MemoryDb};
    use farmlink::domain::services::{apply_transition, plan_transition};
    use farmlink::{Order, OrderItem, OrderStatus, PaymentMethod};

    fn service(db: &Arc<MemoryDb>) -> StatisticsService<MemoryDb, MemoryDb, MemoryDb, MemoryDb> {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        StatisticsService::new(db.clone(), db.clone(), db.clone(), db.clone(), offset)
    }

    fn order(buyer: &Actor, farmer_id: uuid::Uuid, price: i64) -> Order {
        Order::new(
            buyer.account_id,
            farmer_id,
            postal(),
            None,
            vec![OrderItem {
                product_id: uuid::Uuid::new_v4(),
                product_name: "Bơ sáp".into(),
                thumbnail: None,
                unit_price: price,
                quantity: 1,
            }],
            PaymentMethod::Cod,
        )
    }

    #[tokio::test]
    async fn farmer_dashboard_counts_delivered_revenue_only() {
        let db = MemoryDb::new();
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        let buyer = db.seed_account("buyer@example.com", &[Role::Consumer]);
        let farmer_id = farmer.farmer_id.unwrap();
        let veg = db.seed_category("Rau củ", None);
        db.seed_product(farmer_id, veg.id, 10_000, 3);

        let mut delivered = order(&buyer, farmer_id, 30_000);
        for to in [
            OrderStatus::Confirmed,
            OrderStatus::Delivering,
            OrderStatus::Delivered,
        ] {
            let plan = plan_transition(&delivered, &farmer, Role::Farmer, to).unwrap();
            apply_transition(&mut delivered, &plan, None);
        }
        db.insert_order(&delivered);
        db.insert_order(&order(&buyer, farmer_id, 99_000));

        let dashboard = service(&db).farmer_dashboard(&farmer).await.unwrap();
        assert_eq!(dashboard.revenue_today, 30_000);
        assert_eq!(dashboard.revenue_year, 30_000);
        assert_eq!(dashboard.order_count, 2);
        assert_eq!(dashboard.customer_count, 1);
        assert_eq!(dashboard.product_count, 1);
        assert_eq!(dashboard.monthly.len(), 12);

        let err = service(&db).farmer_dashboard(&buyer).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_overview_requires_admin() {
        let db = MemoryDb::new();
        let admin = db.seed_account("admin@example.com", &[Role::Admin]);
        let farmer = db.seed_account("farm@example.com", &[Role::Farmer]);
        db.insert_order(&order(&admin, farmer.farmer_id.unwrap(), 50_000));

        let overview = service(&db).admin_overview(&admin).await.unwrap();
        assert_eq!(overview.account_count, 2);
        assert_eq!(overview.farmer_count, 1);
        assert_eq!(overview.gross_revenue, 0);

        assert!(service(&db).admin_overview(&farmer).await.is_err());
    }
}
