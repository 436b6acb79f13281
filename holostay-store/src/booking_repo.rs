use async_trait::async_trait;
use uuid::Uuid;
use sqlx::PgPool;
use holostay_core::booking::{Booking, BookingStatus, NewBooking};
use holostay_core::repository::BookingRepository;

const BOOKING_COLUMNS: &str = "id, user_id, room_id, check_in, check_out, total_price, status, created_at";

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    room_id: Uuid,
    check_in: chrono::NaiveDate,
    check_out: chrono::NaiveDate,
    total_price: f64,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = holostay_core::CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            room_id: row.room_id,
            check_in: row.check_in,
            check_out: row.check_out,
            total_price: row.total_price,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_booking(
        &self,
        booking: &NewBooking,
    ) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        let row: BookingRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO bookings (id, user_id, room_id, check_in, check_out, total_price, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(booking.user_id)
        .bind(booking.room_id)
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.total_price)
        .bind(BookingStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(Booking::try_from(row)?)
    }

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Ok(Some(Booking::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn list_bookings(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let bookings = rows
            .into_iter()
            .map(Booking::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bookings)
    }

    async fn transition_booking(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let status = status.settlement_target()?;
        let result = sqlx::query(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2 AND status = 'pending'",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
