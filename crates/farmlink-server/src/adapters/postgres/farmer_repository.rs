//! PostgreSQL implementation of FarmerRepository

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use farmlink::{DomainError, Farmer, FarmerRepository, FarmerStatus, PostalAddress};

use super::{db_error, parse_column};

pub struct PgFarmerRepository {
    pool: PgPool,
}

impl PgFarmerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FarmerRow {
    id: Uuid,
    account_id: Uuid,
    name: String,
    avatar: Option<String>,
    cover_image: Option<String>,
    description: Option<String>,
    rating: f64,
    status: String,
    address: Option<Json<PostalAddress>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<FarmerRow> for Farmer {
    type Error = DomainError;

    fn try_from(row: FarmerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            account_id: row.account_id,
            name: row.name,
            avatar: row.avatar,
            cover_image: row.cover_image,
            description: row.description,
            rating: row.rating,
            status: parse_column::<FarmerStatus>(&row.status)?,
            address: row.address.map(|json| json.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl FarmerRepository for PgFarmerRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Farmer>, DomainError> {
        let row = sqlx::query_as::<_, FarmerRow>("SELECT * FROM farmers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Farmer>, DomainError> {
        let row = sqlx::query_as::<_, FarmerRow>("SELECT * FROM farmers WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Farmer>, DomainError> {
        let rows = sqlx::query_as::<_, FarmerRow>("SELECT * FROM farmers ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn create_for_account(&self, farmer: &Farmer) -> Result<Farmer, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let granted = sqlx::query(
            r#"
            UPDATE accounts
            SET roles = array_append(roles, 'FARMER'), updated_at = NOW()
            WHERE id = $1 AND NOT ('FARMER' = ANY(roles))
            "#,
        )
        .bind(farmer.account_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        if granted.rows_affected() == 0 {
            return Err(DomainError::conflict("account is already a farmer"));
        }

        let row = sqlx::query_as::<_, FarmerRow>(
            r#"
            INSERT INTO farmers (id, account_id, name, avatar, cover_image, description, rating,
                                 status, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(farmer.id)
        .bind(farmer.account_id)
        .bind(&farmer.name)
        .bind(&farmer.avatar)
        .bind(&farmer.cover_image)
        .bind(&farmer.description)
        .bind(farmer.rating)
        .bind(farmer.status.to_string())
        .bind(farmer.address.as_ref().map(Json))
        .bind(farmer.created_at)
        .bind(farmer.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        row.try_into()
    }

    async fn save(&self, farmer: &Farmer) -> Result<Farmer, DomainError> {
        let row = sqlx::query_as::<_, FarmerRow>(
            r#"
            UPDATE farmers
            SET name = $2, avatar = $3, cover_image = $4, description = $5, rating = $6,
                status = $7, address = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(farmer.id)
        .bind(&farmer.name)
        .bind(&farmer.avatar)
        .bind(&farmer.cover_image)
        .bind(&farmer.description)
        .bind(farmer.rating)
        .bind(farmer.status.to_string())
        .bind(farmer.address.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or_else(|| DomainError::not_found("Farmer", farmer.id))?;

        row.try_into()
    }

    async fn count(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM farmers")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }
}
