//! PostgreSQL implementation of OrderRepository
//!
//! Orders are stored across `orders`, `order_items` and
//! `order_status_history`; reads stitch the three back together.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use farmlink::domain::services::TransitionPlan;
use farmlink::{
    DomainError, Order, OrderItem, OrderRepository, OrderStatus, PaymentMethod, PaymentStatus,
    PostalAddress, Role, StatusChange,
};

use super::{db_error, parse_column};

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    account_id: Uuid,
    farmer_id: Uuid,
    shipping_address: Json<PostalAddress>,
    note: Option<String>,
    total_price: i64,
    total_quantity: i32,
    status: String,
    payment_status: String,
    payment_method: String,
    last_status_change_reason: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    thumbnail: Option<String>,
    unit_price: i64,
    quantity: i32,
}

#[derive(sqlx::FromRow)]
struct StatusChangeRow {
    order_id: Uuid,
    from_status: Option<String>,
    to_status: String,
    actor_role: String,
    reason: Option<String>,
    changed_at: chrono::DateTime<chrono::Utc>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: row.product_id,
            product_name: row.product_name,
            thumbnail: row.thumbnail,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

impl TryFrom<StatusChangeRow> for StatusChange {
    type Error = DomainError;

    fn try_from(row: StatusChangeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            from: row
                .from_status
                .as_deref()
                .map(parse_column::<OrderStatus>)
                .transpose()?,
            to: parse_column(&row.to_status)?,
            actor_role: parse_column::<Role>(&row.actor_role)?,
            reason: row.reason,
            at: row.changed_at,
        })
    }
}

fn assemble(
    row: OrderRow,
    items: Vec<OrderItem>,
    history: Vec<StatusChange>,
) -> Result<Order, DomainError> {
    Ok(Order {
        id: row.id,
        account_id: row.account_id,
        farmer_id: row.farmer_id,
        shipping_address: row.shipping_address.0,
        note: row.note,
        items,
        total_price: row.total_price,
        total_quantity: row.total_quantity,
        status: parse_column(&row.status)?,
        payment_status: parse_column::<PaymentStatus>(&row.payment_status)?,
        payment_method: parse_column::<PaymentMethod>(&row.payment_method)?,
        last_status_change_reason: row.last_status_change_reason,
        history,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl PgOrderRepository {
    /// Load items and history for a batch of order rows, keeping row order
    async fn hydrate(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT * FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let history_rows = sqlx::query_as::<_, StatusChangeRow>(
            "SELECT * FROM order_status_history WHERE order_id = ANY($1) ORDER BY order_id, id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            items.entry(row.order_id).or_default().push(row.into());
        }
        let mut history: HashMap<Uuid, Vec<StatusChange>> = HashMap::new();
        for row in history_rows {
            history
                .entry(row.order_id)
                .or_default()
                .push(row.try_into()?);
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                assemble(
                    row,
                    items.remove(&id).unwrap_or_default(),
                    history.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }

    async fn insert_history(
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        change: &StatusChange,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO order_status_history (order_id, from_status, to_status, actor_role, reason, changed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order_id)
        .bind(change.from.map(|s| s.to_string()))
        .bind(change.to.to_string())
        .bind(change.actor_role.to_string())
        .bind(&change.reason)
        .bind(change.at)
        .execute(&mut **tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let row = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE account_id = $1 ORDER BY created_at DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        self.hydrate(rows).await
    }

    async fn find_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE farmer_id = $1 ORDER BY created_at DESC",
        )
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        self.hydrate(rows).await
    }

    async fn find_all(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, DomainError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE $1::text IS NULL OR status = $1 ORDER BY created_at DESC",
        )
        .bind(status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        self.hydrate(rows).await
    }

    async fn place(&self, order: &Order, cart_item_ids: &[Uuid]) -> Result<Order, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // Row locks here serialize checkouts sharing a cart line
        let consumed = sqlx::query("DELETE FROM cart_items WHERE id = ANY($1) AND account_id = $2")
            .bind(cart_item_ids)
            .bind(order.account_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        if consumed.rows_affected() != cart_item_ids.len() as u64 {
            return Err(DomainError::conflict("cart items were already checked out"));
        }

        for item in &order.items {
            let taken = sqlx::query(
                r#"
                UPDATE products SET inventory = inventory - $2, updated_at = NOW()
                WHERE id = $1 AND status = 'ACTIVE' AND inventory >= $2
                "#,
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

            if taken.rows_affected() == 0 {
                return Err(DomainError::conflict(format!(
                    "not enough stock left for {}",
                    item.product_name
                )));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO orders (id, account_id, farmer_id, shipping_address, note, total_price,
                                total_quantity, status, payment_status, payment_method,
                                last_status_change_reason, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(order.id)
        .bind(order.account_id)
        .bind(order.farmer_id)
        .bind(Json(&order.shipping_address))
        .bind(&order.note)
        .bind(order.total_price)
        .bind(order.total_quantity)
        .bind(order.status.to_string())
        .bind(order.payment_status.to_string())
        .bind(order.payment_method.to_string())
        .bind(&order.last_status_change_reason)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, product_name, thumbnail,
                                         unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(order.id)
            .bind(position as i32)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(&item.thumbnail)
            .bind(item.unit_price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        for change in &order.history {
            Self::insert_history(&mut tx, order.id, change).await?;
        }

        tx.commit().await.map_err(db_error)?;

        self.find_by_id(order.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", order.id))
    }

    async fn apply_transition(
        &self,
        order: &Order,
        plan: &TransitionPlan,
    ) -> Result<Order, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, payment_status = $3, last_status_change_reason = $4, updated_at = NOW()
            WHERE id = $1 AND status = $5 AND payment_status = $6
            "#,
        )
        .bind(order.id)
        .bind(order.status.to_string())
        .bind(order.payment_status.to_string())
        .bind(&order.last_status_change_reason)
        .bind(plan.from.to_string())
        .bind(plan.from_payment.to_string())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::conflict(format!(
                "order {} changed since it was read ({}, payment {})",
                order.id, plan.from, plan.from_payment
            )));
        }

        let effects = plan.effects;

        if let Some(change) = order.history.last() {
            Self::insert_history(&mut tx, order.id, change).await?;
        }

        for item in &order.items {
            if effects.restore_inventory {
                sqlx::query(
                    "UPDATE products SET inventory = inventory + $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(item.product_id)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
            }
            if effects.add_sold {
                sqlx::query("UPDATE products SET sold = sold + $2, updated_at = NOW() WHERE id = $1")
                    .bind(item.product_id)
                    .bind(item.quantity)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error)?;
            }
        }

        tx.commit().await.map_err(db_error)?;

        self.find_by_id(order.id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", order.id))
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        status: PaymentStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_status = $3, updated_at = NOW()
             WHERE id = $1 AND payment_status = $2",
        )
        .bind(id)
        .bind(expected.to_string())
        .bind(status.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn totals_by_status(&self) -> Result<Vec<(OrderStatus, i64, i64)>, DomainError> {
        let rows = sqlx::query_as::<_, (String, i64, i64)>(
            "SELECT status, COUNT(*), COALESCE(SUM(total_price), 0)::bigint FROM orders GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|(status, count, total)| Ok((parse_column::<OrderStatus>(&status)?, count, total)))
            .collect()
    }
}
