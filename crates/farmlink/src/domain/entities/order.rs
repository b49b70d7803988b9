//! Order - Checkout result with its status history
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{
    OrderStatus, PaymentMethod, PaymentStatus, PostalAddress, Role,
};

/// Order - one consumer buying from one farmer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub account_id: Uuid,
    pub farmer_id: Uuid,
    /// Copy of the delivery address at checkout time
    pub shipping_address: PostalAddress,
    pub note: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_price: i64,
    pub total_quantity: i32,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub last_status_change_reason: Option<String>,
    pub history: Vec<StatusChange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ordered line with the product details frozen at checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub thumbnail: Option<String>,
    pub unit_price: i64,
    pub quantity: i32,
}

impl OrderItem {
    pub fn subtotal(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }
}

/// One entry of an order's status history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: Option<OrderStatus>,
    pub to: OrderStatus,
    pub actor_role: Role,
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

impl Order {
    /// New PENDING order; totals are derived from the items
    pub fn new(
        account_id: Uuid,
        farmer_id: Uuid,
        shipping_address: PostalAddress,
        note: Option<String>,
        items: Vec<OrderItem>,
        payment_method: PaymentMethod,
    ) -> Self {
        let now = Utc::now();
        let total_price = items
            .iter()
            .fold(0i64, |sum, item| sum.saturating_add(item.subtotal()));
        let total_quantity = items
            .iter()
            .fold(0i32, |sum, item| sum.saturating_add(item.quantity));
        Self {
            id: Uuid::new_v4(),
            account_id,
            farmer_id,
            shipping_address,
            note,
            items,
            total_price,
            total_quantity,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method,
            last_status_change_reason: None,
            history: vec![StatusChange {
                from: None,
                to: OrderStatus::Pending,
                actor_role: Role::Consumer,
                reason: None,
                at: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }
}
