//! PostgreSQL implementation of AddressRepository
//!
//! The partial unique index on `(account_id) WHERE is_default` backs the
//! single-default rule; writes demote the old default first.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use farmlink::{Address, AddressRepository, DomainError, PostalAddress};

use super::db_error;

pub struct PgAddressRepository {
    pool: PgPool,
}

impl PgAddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn demote_default(
        tx: &mut Transaction<'_, Postgres>,
        account_id: Uuid,
        keep: Uuid,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE addresses SET is_default = FALSE, updated_at = NOW()
             WHERE account_id = $1 AND is_default AND id <> $2",
        )
        .bind(account_id)
        .bind(keep)
        .execute(&mut **tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: Uuid,
    account_id: Uuid,
    receiver_name: String,
    receiver_phone: String,
    province: String,
    district: String,
    ward: String,
    detail: String,
    is_default: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            postal: PostalAddress {
                receiver_name: row.receiver_name,
                receiver_phone: row.receiver_phone,
                province: row.province,
                district: row.district,
                ward: row.ward,
                detail: row.detail,
            },
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl AddressRepository for PgAddressRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Address>, DomainError> {
        let row = sqlx::query_as::<_, AddressRow>("SELECT * FROM addresses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<Address>, DomainError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            "SELECT * FROM addresses WHERE account_id = $1
             ORDER BY is_default DESC, created_at DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, address: &Address) -> Result<Address, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        if address.is_default {
            Self::demote_default(&mut tx, address.account_id, address.id).await?;
        }

        let p = &address.postal;
        let row = sqlx::query_as::<_, AddressRow>(
            r#"
            INSERT INTO addresses (id, account_id, receiver_name, receiver_phone, province,
                                   district, ward, detail, is_default, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(address.id)
        .bind(address.account_id)
        .bind(&p.receiver_name)
        .bind(&p.receiver_phone)
        .bind(&p.province)
        .bind(&p.district)
        .bind(&p.ward)
        .bind(&p.detail)
        .bind(address.is_default)
        .bind(address.created_at)
        .bind(address.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(row.into())
    }

    async fn update(&self, address: &Address) -> Result<Address, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        if address.is_default {
            Self::demote_default(&mut tx, address.account_id, address.id).await?;
        }

        let p = &address.postal;
        let row = sqlx::query_as::<_, AddressRow>(
            r#"
            UPDATE addresses
            SET receiver_name = $2, receiver_phone = $3, province = $4, district = $5,
                ward = $6, detail = $7, is_default = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(address.id)
        .bind(&p.receiver_name)
        .bind(&p.receiver_phone)
        .bind(&p.province)
        .bind(&p.district)
        .bind(&p.ward)
        .bind(&p.detail)
        .bind(address.is_default)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?
        .ok_or_else(|| DomainError::not_found("Address", address.id))?;

        tx.commit().await.map_err(db_error)?;
        Ok(row.into())
    }

    async fn set_default(&self, account_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        Self::demote_default(&mut tx, account_id, id).await?;

        let result = sqlx::query(
            "UPDATE addresses SET is_default = TRUE, updated_at = NOW()
             WHERE id = $1 AND account_id = $2",
        )
        .bind(id)
        .bind(account_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Address", id));
        }
        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn delete(&self, account_id: Uuid, id: Uuid) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let was_default = sqlx::query_scalar::<_, bool>(
            "DELETE FROM addresses WHERE id = $1 AND account_id = $2 RETURNING is_default",
        )
        .bind(id)
        .bind(account_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error)?;

        let Some(was_default) = was_default else {
            return Ok(false);
        };

        if was_default {
            sqlx::query(
                r#"
                UPDATE addresses SET is_default = TRUE, updated_at = NOW()
                WHERE id = (
                    SELECT id FROM addresses WHERE account_id = $1
                    ORDER BY created_at DESC LIMIT 1
                )
                "#,
            )
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        Ok(true)
    }
}
