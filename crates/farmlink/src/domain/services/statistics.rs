//! Statistics - Dashboard figures for farmers and administrators
//!
//! Revenue only counts orders that reached the customer (DELIVERED or
//! RECEIVED). Calendar boundaries are taken in the offset of `now`.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::Order;
use crate::domain::value_objects::{OrderStatus, ProductStatus};

pub const TOP_PRODUCTS: usize = 10;
pub const TOP_CUSTOMERS: usize = 10;
pub const MONTHS_SHOWN: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductSales {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerOrders {
    pub account_id: Uuid,
    pub order_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyFigures {
    pub year: i32,
    pub month: u32,
    pub revenue: i64,
    pub order_count: i64,
    pub new_customers: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCount<S> {
    pub status: S,
    pub count: i64,
}

/// Everything shown on a farmer's statistics page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmerDashboard {
    pub revenue_today: i64,
    pub revenue_week: i64,
    pub revenue_month: i64,
    pub revenue_year: i64,
    pub order_count: i64,
    pub customer_count: i64,
    pub product_count: i64,
    /// Revenue per product, largest first
    pub product_revenue: Vec<ProductSales>,
    /// Best sellers by quantity
    pub top_products: Vec<ProductSales>,
    /// Customers with the most orders
    pub loyal_customers: Vec<CustomerOrders>,
    pub orders_by_status: Vec<StatusCount<OrderStatus>>,
    /// Oldest month first, current month last
    pub monthly: Vec<MonthlyFigures>,
}

/// Platform-wide totals for administrators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminOverview {
    pub account_count: i64,
    pub farmer_count: i64,
    pub products_by_status: Vec<StatusCount<ProductStatus>>,
    pub orders_by_status: Vec<StatusCount<OrderStatus>>,
    pub gross_revenue: i64,
}

/// Compute a farmer's dashboard from all of that farmer's orders.
pub fn farmer_dashboard(
    orders: &[Order],
    product_count: i64,
    now: DateTime<FixedOffset>,
) -> FarmerDashboard {
    let offset = *now.offset();
    let today = now.date_naive();
    let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));

    let months = last_months(today, MONTHS_SHOWN);
    let mut monthly: BTreeMap<(i32, u32), MonthlyFigures> = months
        .iter()
        .map(|&(year, month)| {
            (
                (year, month),
                MonthlyFigures {
                    year,
                    month,
                    revenue: 0,
                    order_count: 0,
                    new_customers: 0,
                },
            )
        })
        .collect();

    let mut revenue_today = 0;
    let mut revenue_week = 0;
    let mut revenue_month = 0;
    let mut revenue_year = 0;
    let mut customers = HashSet::new();
    let mut first_order: HashMap<Uuid, DateTime<FixedOffset>> = HashMap::new();
    let mut per_customer: HashMap<Uuid, i64> = HashMap::new();
    let mut per_product: HashMap<Uuid, ProductSales> = HashMap::new();
    let mut per_status: HashMap<OrderStatus, i64> = HashMap::new();

    for order in orders {
        let created = order.created_at.with_timezone(&offset);
        let date = created.date_naive();
        let key = (date.year(), date.month());

        customers.insert(order.account_id);
        *per_customer.entry(order.account_id).or_default() += 1;
        *per_status.entry(order.status).or_default() += 1;
        first_order
            .entry(order.account_id)
            .and_modify(|first| {
                if created < *first {
                    *first = created;
                }
            })
            .or_insert(created);

        if let Some(figures) = monthly.get_mut(&key) {
            figures.order_count += 1;
        }

        if !order.status.is_completed() {
            continue;
        }

        let price = order.total_price;
        if date == today {
            revenue_today += price;
        }
        if date >= week_start && created <= now {
            revenue_week += price;
        }
        if key == (today.year(), today.month()) {
            revenue_month += price;
        }
        if date.year() == today.year() {
            revenue_year += price;
        }
        if let Some(figures) = monthly.get_mut(&key) {
            figures.revenue += price;
        }

        for item in &order.items {
            let entry = per_product
                .entry(item.product_id)
                .or_insert_with(|| ProductSales {
                    product_id: item.product_id,
                    product_name: item.product_name.clone(),
                    quantity: 0,
                    revenue: 0,
                });
            entry.quantity += i64::from(item.quantity);
            entry.revenue += item.subtotal();
        }
    }

    for first in first_order.values() {
        let date = first.date_naive();
        if let Some(figures) = monthly.get_mut(&(date.year(), date.month())) {
            figures.new_customers += 1;
        }
    }

    let mut product_revenue: Vec<ProductSales> = per_product.into_values().collect();
    product_revenue.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });

    let mut top_products = product_revenue.clone();
    top_products.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    top_products.truncate(TOP_PRODUCTS);

    let mut loyal_customers: Vec<CustomerOrders> = per_customer
        .into_iter()
        .map(|(account_id, order_count)| CustomerOrders {
            account_id,
            order_count,
        })
        .collect();
    loyal_customers.sort_by(|a, b| {
        b.order_count
            .cmp(&a.order_count)
            .then_with(|| a.account_id.cmp(&b.account_id))
    });
    loyal_customers.truncate(TOP_CUSTOMERS);

    FarmerDashboard {
        revenue_today,
        revenue_week,
        revenue_month,
        revenue_year,
        order_count: orders.len() as i64,
        customer_count: customers.len() as i64,
        product_count,
        product_revenue,
        top_products,
        loyal_customers,
        orders_by_status: OrderStatus::ALL
            .iter()
            .map(|s| StatusCount {
                status: *s,
                count: per_status.get(s).copied().unwrap_or(0),
            })
            .collect(),
        monthly: monthly.into_values().collect(),
    }
}

/// Assemble the admin overview from per-status counts.
///
/// `orders` carries `(status, order count, summed total price)`; statuses
/// missing from either list count as zero.
pub fn admin_overview(
    account_count: i64,
    farmer_count: i64,
    products: &[(ProductStatus, i64)],
    orders: &[(OrderStatus, i64, i64)],
) -> AdminOverview {
    let products_by_status = ProductStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: products
                .iter()
                .filter(|(s, _)| s == status)
                .map(|(_, n)| n)
                .sum(),
        })
        .collect();

    let orders_by_status = OrderStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: orders
                .iter()
                .filter(|(s, _, _)| s == status)
                .map(|(_, n, _)| n)
                .sum(),
        })
        .collect();

    let gross_revenue = orders
        .iter()
        .filter(|(s, _, _)| s.is_completed())
        .map(|(_, _, total)| total)
        .sum();

    AdminOverview {
        account_count,
        farmer_count,
        products_by_status,
        orders_by_status,
        gross_revenue,
    }
}

/// `(year, month)` of the last `count` months ending with the month of `today`
fn last_months(today: NaiveDate, count: usize) -> Vec<(i32, u32)> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..count as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        })
        .collect()
}
