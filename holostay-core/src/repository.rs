use async_trait::async_trait;
use uuid::Uuid;
use holostay_catalog::{Room, RoomFilters};
use crate::booking::{Booking, BookingStatus, NewBooking};
use crate::payment::{NewPayment, Payment, PaymentStatus};

/// Repository trait for room catalog access (read-only)
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Rooms matching the filters, highest rated first
    async fn list_rooms(
        &self,
        filters: &RoomFilters,
    ) -> Result<Vec<Room>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_room(
        &self,
        id: Uuid,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_amenities(
        &self,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for booking records
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking in `pending` state
    async fn create_booking(
        &self,
        booking: &NewBooking,
    ) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    /// The user's bookings, newest first
    async fn list_bookings(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    /// Move a `pending` booking to `status`. Returns false when no pending
    /// booking with that id exists, leaving terminal bookings untouched.
    async fn transition_booking(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for payment attempts
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a payment in `pending` state
    async fn create_payment(
        &self,
        payment: &NewPayment,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_payment_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>>;

    /// Move the `pending` payment for an external session to `status`.
    /// Returns false when nothing was pending for that session.
    async fn transition_payment(
        &self,
        session_id: &str,
        status: PaymentStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
