//! Order DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use farmlink::domain::services::next_statuses;
use farmlink::{
    Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Role, StatusChange,
};

use super::PostalAddressDto;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub address_id: Uuid,
    pub farmer_id: Uuid,
    /// Cart item ids; all must hold products of `farmer_id`
    pub items: Vec<Uuid>,
    #[schema(value_type = String, example = "COD")]
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeOrderStatusRequest {
    pub order_id: Uuid,
    #[schema(value_type = String, example = "CONFIRMED")]
    pub status: OrderStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListParams {
    #[param(value_type = Option<String>)]
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub thumbnail: Option<String>,
    pub unit_price: i64,
    pub quantity: i32,
    pub subtotal: i64,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        Self {
            subtotal: i.subtotal(),
            product_id: i.product_id,
            product_name: i.product_name,
            thumbnail: i.thumbnail,
            unit_price: i.unit_price,
            quantity: i.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChangeResponse {
    #[schema(value_type = Option<String>)]
    pub from: Option<OrderStatus>,
    #[schema(value_type = String)]
    pub to: OrderStatus,
    #[schema(value_type = String)]
    pub actor_role: Role,
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

impl From<StatusChange> for StatusChangeResponse {
    fn from(c: StatusChange) -> Self {
        Self {
            from: c.from,
            to: c.to,
            actor_role: c.actor_role,
            reason: c.reason,
            at: c.at,
        }
    }
}

/// Statuses each role may move the order to next
#[derive(Debug, Serialize, ToSchema)]
pub struct NextStatusesResponse {
    #[schema(value_type = Vec<String>)]
    pub consumer: Vec<OrderStatus>,
    #[schema(value_type = Vec<String>)]
    pub farmer: Vec<OrderStatus>,
    #[schema(value_type = Vec<String>)]
    pub admin: Vec<OrderStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub farmer_id: Uuid,
    pub shipping_address: PostalAddressDto,
    pub note: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub total_price: i64,
    pub total_quantity: i32,
    #[schema(value_type = String, example = "PENDING")]
    pub status: OrderStatus,
    #[schema(value_type = String, example = "PENDING")]
    pub payment_status: PaymentStatus,
    #[schema(value_type = String, example = "COD")]
    pub payment_method: PaymentMethod,
    pub last_status_change_reason: Option<String>,
    pub history: Vec<StatusChangeResponse>,
    pub next_statuses: NextStatusesResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            next_statuses: NextStatusesResponse {
                consumer: next_statuses(o.status, Role::Consumer),
                farmer: next_statuses(o.status, Role::Farmer),
                admin: next_statuses(o.status, Role::Admin),
            },
            id: o.id,
            account_id: o.account_id,
            farmer_id: o.farmer_id,
            shipping_address: o.shipping_address.into(),
            note: o.note,
            items: o.items.into_iter().map(Into::into).collect(),
            total_price: o.total_price,
            total_quantity: o.total_quantity,
            status: o.status,
            payment_status: o.payment_status,
            payment_method: o.payment_method,
            last_status_change_reason: o.last_status_change_reason,
            history: o.history.into_iter().map(Into::into).collect(),
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}
