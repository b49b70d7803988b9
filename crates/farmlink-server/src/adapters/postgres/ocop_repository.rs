//! PostgreSQL implementation of OcopRepository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use farmlink::{DomainError, Ocop, OcopRepository, OcopStatus};

use super::{db_error, parse_column};

pub struct PgOcopRepository {
    pool: PgPool,
}

impl PgOcopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OcopRow {
    product_id: Uuid,
    star: i32,
    certificate_number: String,
    issued_year: i32,
    issuer: String,
    images: Vec<String>,
    status: String,
    verified_by: Option<Uuid>,
    verified_at: Option<chrono::DateTime<chrono::Utc>>,
    reason: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<OcopRow> for Ocop {
    type Error = DomainError;

    fn try_from(row: OcopRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: row.product_id,
            star: row.star,
            certificate_number: row.certificate_number,
            issued_year: row.issued_year,
            issuer: row.issuer,
            images: row.images,
            status: parse_column::<OcopStatus>(&row.status)?,
            verified_by: row.verified_by,
            verified_at: row.verified_at,
            reason: row.reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl OcopRepository for PgOcopRepository {
    async fn find_by_product(&self, product_id: Uuid) -> Result<Option<Ocop>, DomainError> {
        let row = sqlx::query_as::<_, OcopRow>("SELECT * FROM ocops WHERE product_id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_all(&self, status: Option<OcopStatus>) -> Result<Vec<Ocop>, DomainError> {
        let rows = sqlx::query_as::<_, OcopRow>(
            r#"
            SELECT * FROM ocops
            WHERE $1::text IS NULL OR status = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn insert(&self, ocop: &Ocop) -> Result<Ocop, DomainError> {
        let row = sqlx::query_as::<_, OcopRow>(
            r#"
            INSERT INTO ocops (product_id, star, certificate_number, issued_year, issuer, images,
                               status, verified_by, verified_at, reason, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(ocop.product_id)
        .bind(ocop.star)
        .bind(&ocop.certificate_number)
        .bind(ocop.issued_year)
        .bind(&ocop.issuer)
        .bind(&ocop.images)
        .bind(ocop.status.to_string())
        .bind(ocop.verified_by)
        .bind(ocop.verified_at)
        .bind(&ocop.reason)
        .bind(ocop.created_at)
        .bind(ocop.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row.try_into()
    }

    async fn update(&self, ocop: &Ocop, expected: OcopStatus) -> Result<Ocop, DomainError> {
        let row = sqlx::query_as::<_, OcopRow>(
            r#"
            UPDATE ocops
            SET star = $2, certificate_number = $3, issued_year = $4, issuer = $5, images = $6,
                status = $7, verified_by = $8, verified_at = $9, reason = $10, updated_at = NOW()
            WHERE product_id = $1 AND status = $11
            RETURNING *
            "#,
        )
        .bind(ocop.product_id)
        .bind(ocop.star)
        .bind(&ocop.certificate_number)
        .bind(ocop.issued_year)
        .bind(&ocop.issuer)
        .bind(&ocop.images)
        .bind(ocop.status.to_string())
        .bind(ocop.verified_by)
        .bind(ocop.verified_at)
        .bind(&ocop.reason)
        .bind(expected.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => row.try_into(),
            None => Err(DomainError::conflict(format!(
                "OCOP of product {} is no longer {}",
                ocop.product_id, expected
            ))),
        }
    }
}
