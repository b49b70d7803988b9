//! PostgreSQL implementation of ProductRepository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use farmlink::{
    DomainError, Page, PageRequest, Product, ProductName, ProductQuery, ProductRepository,
    ProductSort, ProductStatus,
};

use super::{db_error, parse_column};

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    farmer_id: Uuid,
    category_id: Uuid,
    name: String,
    description: Option<String>,
    price: i64,
    inventory: i32,
    sold: i32,
    rating: f64,
    thumbnail: Option<String>,
    unit_price: String,
    images: Vec<String>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            farmer_id: row.farmer_id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            price: row.price,
            inventory: row.inventory,
            sold: row.sold,
            rating: row.rating,
            thumbnail: row.thumbnail,
            unit_price: row.unit_price,
            images: row.images,
            status: parse_column::<ProductStatus>(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

fn order_clause(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::Rating => "p.rating DESC, p.sold DESC, p.id",
        ProductSort::PriceAsc => "p.price ASC, p.id",
        ProductSort::PriceDesc => "p.price DESC, p.id",
        ProductSort::Newest => "p.created_at DESC, p.id",
        ProductSort::BestSelling => "p.sold DESC, p.id",
    }
}

/// Escape LIKE wildcards so a keyword matches literally
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

const CATALOGUE_FILTER: &str = r#"
    FROM products p
    JOIN farmers f ON f.id = p.farmer_id
    WHERE p.status = 'ACTIVE' AND f.status = 'ACTIVE'
      AND ($1::uuid[] IS NULL OR p.category_id = ANY($1))
      AND ($2::text IS NULL OR p.name ILIKE $2)
      AND ($3::bigint IS NULL OR p.price >= $3)
      AND ($4::bigint IS NULL OR p.price <= $4)
"#;

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn save(&self, product: &Product) -> Result<Product, DomainError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (id, farmer_id, category_id, name, description, price, inventory,
                                  sold, rating, thumbnail, unit_price, images, status,
                                  created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW(), $15)
            ON CONFLICT (id) DO UPDATE
            SET category_id = EXCLUDED.category_id,
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                inventory = EXCLUDED.inventory,
                rating = EXCLUDED.rating,
                thumbnail = EXCLUDED.thumbnail,
                unit_price = EXCLUDED.unit_price,
                images = EXCLUDED.images,
                status = EXCLUDED.status,
                updated_at = NOW(),
                deleted_at = EXCLUDED.deleted_at
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(product.farmer_id)
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.inventory)
        .bind(product.sold)
        .bind(product.rating)
        .bind(&product.thumbnail)
        .bind(&product.unit_price)
        .bind(&product.images)
        .bind(product.status.to_string())
        .bind(product.created_at)
        .bind(product.deleted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row.try_into()
    }

    async fn search(
        &self,
        query: &ProductQuery,
        category_ids: Option<&[Uuid]>,
        page: PageRequest,
    ) -> Result<Page<Product>, DomainError> {
        let category_ids = category_ids.map(|ids| ids.to_vec());
        let keyword = query
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(like_pattern);

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {}", CATALOGUE_FILTER))
            .bind(&category_ids)
            .bind(&keyword)
            .bind(query.min_price)
            .bind(query.max_price)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let sql = format!(
            "SELECT p.* {} ORDER BY {} LIMIT $5 OFFSET $6",
            CATALOGUE_FILTER,
            order_clause(query.sort)
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&category_ids)
            .bind(&keyword)
            .bind(query.min_price)
            .bind(query.max_price)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let content = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;
        Ok(Page::new(content, page, total))
    }

    async fn find_by_farmer(&self, farmer_id: Uuid) -> Result<Vec<Product>, DomainError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE farmer_id = $1 AND status <> 'DELETED'
             ORDER BY created_at DESC",
        )
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_all(&self) -> Result<Vec<Product>, DomainError> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT * FROM products ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_names(&self) -> Result<Vec<ProductName>, DomainError> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM products WHERE status = 'ACTIVE' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| ProductName { id, name })
            .collect())
    }

    async fn exists_in_categories(&self, category_ids: &[Uuid]) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE category_id = ANY($1))",
        )
        .bind(category_ids)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn count_by_status(&self) -> Result<Vec<(ProductStatus, i64)>, DomainError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM products GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|(status, count)| Ok((parse_column::<ProductStatus>(&status)?, count)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rau"), "%rau%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_every_sort_has_tiebreaker() {
        for sort in [
            ProductSort::Rating,
            ProductSort::PriceAsc,
            ProductSort::PriceDesc,
            ProductSort::Newest,
            ProductSort::BestSelling,
        ] {
            assert!(order_clause(sort).ends_with("p.id"));
        }
    }
}
