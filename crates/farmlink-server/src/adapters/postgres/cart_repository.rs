//! PostgreSQL implementation of CartRepository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use farmlink::{CartItem, CartLine, CartRepository, DomainError, ProductStatus, ProductSummary};

use super::{db_error, parse_column};

pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: Uuid,
    account_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            product_id: row.product_id,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    #[sqlx(flatten)]
    item: CartItemRow,
    farmer_id: Uuid,
    product_name: String,
    price: i64,
    thumbnail: Option<String>,
    unit_price: String,
    inventory: i32,
    product_status: String,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = DomainError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let product = ProductSummary {
            id: row.item.product_id,
            farmer_id: row.farmer_id,
            name: row.product_name,
            price: row.price,
            thumbnail: row.thumbnail,
            unit_price: row.unit_price,
            inventory: row.inventory,
            status: parse_column::<ProductStatus>(&row.product_status)?,
        };
        Ok(Self {
            item: row.item.into(),
            product,
        })
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CartItem>, DomainError> {
        let row = sqlx::query_as::<_, CartItemRow>("SELECT * FROM cart_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn merge(&self, item: &CartItem) -> Result<CartItem, DomainError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r#"
            INSERT INTO cart_items (id, account_id, product_id, quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (account_id, product_id) DO UPDATE
            SET quantity = LEAST(cart_items.quantity::BIGINT + EXCLUDED.quantity, 2147483647)::INTEGER,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(item.account_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<CartItem>, DomainError> {
        let rows = sqlx::query_as::<_, CartItemRow>("SELECT * FROM cart_items WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_lines(&self, account_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT c.*, p.farmer_id, p.name AS product_name, p.price, p.thumbnail,
                   p.unit_price, p.inventory, p.status AS product_status
            FROM cart_items c
            JOIN products p ON p.id = c.product_id
            WHERE c.account_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn save(&self, item: &CartItem) -> Result<CartItem, DomainError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r#"
            INSERT INTO cart_items (id, account_id, product_id, quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (id) DO UPDATE
            SET quantity = EXCLUDED.quantity, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(item.id)
        .bind(item.account_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, account_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected())
    }
}
