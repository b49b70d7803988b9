//! PostgreSQL implementation of MarketPriceRepository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use farmlink::{DomainError, MarketPrice, MarketPriceRepository};

use super::db_error;

pub struct PgMarketPriceRepository {
    pool: PgPool,
}

impl PgMarketPriceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MarketPriceRow {
    id: Uuid,
    product_id: Uuid,
    price: i64,
    region: String,
    date_recorded: chrono::NaiveDate,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<MarketPriceRow> for MarketPrice {
    fn from(row: MarketPriceRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            price: row.price,
            region: row.region,
            date_recorded: row.date_recorded,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl MarketPriceRepository for PgMarketPriceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MarketPrice>, DomainError> {
        let row = sqlx::query_as::<_, MarketPriceRow>("SELECT * FROM market_prices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_all(&self, product_id: Option<Uuid>) -> Result<Vec<MarketPrice>, DomainError> {
        let rows = sqlx::query_as::<_, MarketPriceRow>(
            r#"
            SELECT * FROM market_prices
            WHERE $1::uuid IS NULL OR product_id = $1
            ORDER BY date_recorded ASC, created_at ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn save(&self, price: &MarketPrice) -> Result<MarketPrice, DomainError> {
        let row = sqlx::query_as::<_, MarketPriceRow>(
            r#"
            INSERT INTO market_prices (id, product_id, price, region, date_recorded, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET product_id = EXCLUDED.product_id,
                price = EXCLUDED.price,
                region = EXCLUDED.region,
                date_recorded = EXCLUDED.date_recorded
            RETURNING *
            "#,
        )
        .bind(price.id)
        .bind(price.product_id)
        .bind(price.price)
        .bind(&price.region)
        .bind(price.date_recorded)
        .bind(price.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM market_prices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
