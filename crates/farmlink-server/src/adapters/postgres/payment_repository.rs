//! PostgreSQL implementation of PaymentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use farmlink::{DomainError, Payment, PaymentMethod, PaymentRepository};

use super::{db_error, parse_column};

pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    method: String,
    amount: i64,
    transaction_no: Option<String>,
    bank_code: Option<String>,
    card_type: Option<String>,
    response_code: Option<String>,
    pay_date: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            method: parse_column::<PaymentMethod>(&row.method)?,
            amount: row.amount,
            transaction_no: row.transaction_no,
            bank_code: row.bank_code,
            card_type: row.card_type,
            response_code: row.response_code,
            pay_date: row.pay_date,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn record_success(&self, payment: &Payment) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // Money captured after a cancel is owed back to the buyer
        let marked = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = CASE WHEN status = 'CANCELED' THEN 'REFUNDED' ELSE 'PAID' END,
                updated_at = NOW()
            WHERE id = $1 AND payment_status NOT IN ('PAID', 'REFUNDED')
            "#,
        )
        .bind(payment.order_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        if marked.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, method, amount, transaction_no, bank_code,
                                  card_type, response_code, pay_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(payment.id)
        .bind(payment.order_id)
        .bind(payment.method.to_string())
        .bind(payment.amount)
        .bind(&payment.transaction_no)
        .bind(&payment.bank_code)
        .bind(&payment.card_type)
        .bind(&payment.response_code)
        .bind(&payment.pay_date)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(true)
    }

    async fn find_by_order(&self, order_id: Uuid) -> Result<Option<Payment>, DomainError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            "SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(TryInto::try_into).transpose()
    }
}
