use async_trait::async_trait;
use uuid::Uuid;
use sqlx::PgPool;
use holostay_core::payment::{NewPayment, Payment, PaymentStatus};
use holostay_core::repository::PaymentRepository;

const PAYMENT_COLUMNS: &str = "id, booking_id, user_id, stripe_session_id, amount, status, created_at";

pub struct StorePaymentRepository {
    pool: PgPool,
}

impl StorePaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    booking_id: Uuid,
    user_id: Uuid,
    stripe_session_id: String,
    amount: f64,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = holostay_core::CoreError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: row.id,
            booking_id: row.booking_id,
            user_id: row.user_id,
            session_id: row.stripe_session_id,
            amount: row.amount,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl PaymentRepository for StorePaymentRepository {
    async fn create_payment(
        &self,
        payment: &NewPayment,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        let row: PaymentRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO payments (id, booking_id, user_id, stripe_session_id, amount, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(payment.booking_id)
        .bind(payment.user_id)
        .bind(&payment.session_id)
        .bind(payment.amount)
        .bind(PaymentStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(Payment::try_from(row)?)
    }

    async fn get_payment_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE stripe_session_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Payment::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn transition_payment(
        &self,
        session_id: &str,
        status: PaymentStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let status = status.settlement_target()?;
        let result = sqlx::query(
            "UPDATE payments SET status = $1, updated_at = NOW() WHERE stripe_session_id = $2 AND status = 'pending'",
        )
        .bind(status.as_str())
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
