//! Statistics DTOs

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use farmlink::domain::services::{
    AdminOverview, CustomerOrders, FarmerDashboard, MonthlyFigures, ProductSales, StatusCount,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSalesResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    pub revenue: i64,
}

impl From<ProductSales> for ProductSalesResponse {
    fn from(p: ProductSales) -> Self {
        Self {
            product_id: p.product_id,
            product_name: p.product_name,
            quantity: p.quantity,
            revenue: p.revenue,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerOrdersResponse {
    pub account_id: Uuid,
    pub order_count: i64,
}

impl From<CustomerOrders> for CustomerOrdersResponse {
    fn from(c: CustomerOrders) -> Self {
        Self {
            account_id: c.account_id,
            order_count: c.order_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyFiguresResponse {
    pub year: i32,
    pub month: u32,
    pub revenue: i64,
    pub order_count: i64,
    /// Customers whose first order with this farmer falls in the month
    pub new_customers: i64,
}

impl From<MonthlyFigures> for MonthlyFiguresResponse {
    fn from(m: MonthlyFigures) -> Self {
        Self {
            year: m.year,
            month: m.month,
            revenue: m.revenue,
            order_count: m.order_count,
            new_customers: m.new_customers,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCountResponse {
    pub status: String,
    pub count: i64,
}

impl<S: std::fmt::Display> From<StatusCount<S>> for StatusCountResponse {
    fn from(c: StatusCount<S>) -> Self {
        Self {
            status: c.status.to_string(),
            count: c.count,
        }
    }
}

/// Revenue figures count DELIVERED and RECEIVED orders only
#[derive(Debug, Serialize, ToSchema)]
pub struct FarmerDashboardResponse {
    pub revenue_today: i64,
    /// Week starts on Sunday
    pub revenue_week: i64,
    pub revenue_month: i64,
    pub revenue_year: i64,
    pub order_count: i64,
    pub customer_count: i64,
    pub product_count: i64,
    pub product_revenue: Vec<ProductSalesResponse>,
    pub top_products: Vec<ProductSalesResponse>,
    pub loyal_customers: Vec<CustomerOrdersResponse>,
    pub orders_by_status: Vec<StatusCountResponse>,
    /// Last 12 calendar months, oldest first
    pub monthly: Vec<MonthlyFiguresResponse>,
}

fn convert<T, U: From<T>>(items: Vec<T>) -> Vec<U> {
    items.into_iter().map(U::from).collect()
}

impl From<FarmerDashboard> for FarmerDashboardResponse {
    fn from(d: FarmerDashboard) -> Self {
        Self {
            revenue_today: d.revenue_today,
            revenue_week: d.revenue_week,
            revenue_month: d.revenue_month,
            revenue_year: d.revenue_year,
            order_count: d.order_count,
            customer_count: d.customer_count,
            product_count: d.product_count,
            product_revenue: convert(d.product_revenue),
            top_products: convert(d.top_products),
            loyal_customers: convert(d.loyal_customers),
            orders_by_status: convert(d.orders_by_status),
            monthly: convert(d.monthly),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOverviewResponse {
    pub account_count: i64,
    pub farmer_count: i64,
    pub products_by_status: Vec<StatusCountResponse>,
    pub orders_by_status: Vec<StatusCountResponse>,
    /// Sum over DELIVERED and RECEIVED orders
    pub gross_revenue: i64,
}

impl From<AdminOverview> for AdminOverviewResponse {
    fn from(o: AdminOverview) -> Self {
        Self {
            account_count: o.account_count,
            farmer_count: o.farmer_count,
            products_by_status: convert(o.products_by_status),
            orders_by_status: convert(o.orders_by_status),
            gross_revenue: o.gross_revenue,
        }
    }
}
