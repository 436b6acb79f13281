use std::sync::Arc;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use holostay_catalog::{nights_between, quote_total};
use holostay_core::booking::{BookingStatus, NewBooking};
use holostay_core::identity::Identity;
use holostay_core::payment::{to_minor_units, CheckoutProvider, CheckoutSessionRequest, CorrelationMetadata, NewPayment};
use holostay_core::repository::{BookingRepository, PaymentRepository, RoomRepository};
use holostay_core::CoreError;
use holostay_shared::models::events::{BookingCancelledEvent, BookingCreatedEvent};
use crate::error::CheckoutError;

/// Checkout request as sent by the storefront. Fields are optional so that
/// absent values surface as a validation error instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub room_id: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub total_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub session_url: Option<String>,
}

/// Creates the pending booking + payment pair behind a hosted checkout session
pub struct CheckoutInitiator {
    rooms: Arc<dyn RoomRepository>,
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
    provider: Arc<dyn CheckoutProvider>,
    currency: String,
    enforce_server_pricing: bool,
}

impl CheckoutInitiator {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentRepository>,
        provider: Arc<dyn CheckoutProvider>,
    ) -> Self {
        Self {
            rooms,
            bookings,
            payments,
            provider,
            currency: "usd".to_string(),
            enforce_server_pricing: false,
        }
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_ascii_lowercase();
        self
    }

    pub fn with_server_pricing(mut self, enforce: bool) -> Self {
        self.enforce_server_pricing = enforce;
        self
    }

    pub async fn create_session(
        &self,
        identity: Option<&Identity>,
        request: CheckoutRequest,
        redirect_origin: &str,
    ) -> Result<CheckoutResponse, CheckoutError> {
        // 1. Caller must be authenticated
        let identity = identity.ok_or(CheckoutError::Unauthenticated)?;

        // 2. Every field present
        let (room_id, check_in, check_out, total_price) = match request {
            CheckoutRequest {
                room_id: Some(room_id),
                check_in: Some(check_in),
                check_out: Some(check_out),
                total_price: Some(total_price),
            } if !room_id.trim().is_empty()
                && !check_in.trim().is_empty()
                && !check_out.trim().is_empty()
                && total_price != 0.0 =>
            {
                (room_id, check_in, check_out, total_price)
            }
            _ => return Err(CheckoutError::missing_fields()),
        };

        let new_booking = NewBooking {
            user_id: identity.user_id,
            room_id: Uuid::nil(),
            check_in: parse_date(&check_in)?,
            check_out: parse_date(&check_out)?,
            total_price,
        };
        new_booking.validate().map_err(|e| match e {
            CoreError::ValidationError(msg) => CheckoutError::Validation(msg),
            other => CheckoutError::Validation(other.to_string()),
        })?;

        // 3. Room must exist
        let room_id = Uuid::parse_str(room_id.trim()).map_err(|_| CheckoutError::RoomNotFound)?;
        let room = self
            .rooms
            .get_room(room_id)
            .await
            .map_err(|e| CheckoutError::Persistence(e.to_string()))?
            .ok_or(CheckoutError::RoomNotFound)?;

        // The storefront computes the total; it is trusted unless server pricing is enforced
        let nights = nights_between(new_booking.check_in, new_booking.check_out);
        let quoted = quote_total(room.price_per_night, nights);
        if (quoted - total_price).abs() >= 0.01 {
            tracing::warn!(
                room_id = %room.id,
                quoted,
                submitted = total_price,
                "Checkout total differs from nightly rate × {} nights",
                nights
            );
            if self.enforce_server_pricing {
                return Err(CheckoutError::Validation("Total price does not match room rate".to_string()));
            }
        }

        // 4. Pending booking
        let booking = self
            .bookings
            .create_booking(&NewBooking { room_id: room.id, ..new_booking })
            .await
            .map_err(|e| {
                tracing::error!("Failed to create booking: {}", e);
                CheckoutError::Persistence(e.to_string())
            })?;

        log_event(
            "booking.created",
            &BookingCreatedEvent {
                booking_id: booking.id,
                room_id: room.id,
                user_id: identity.user_id,
                total_price,
                timestamp: chrono::Utc::now().timestamp(),
            },
        );

        // 5. Hosted checkout session
        let origin = redirect_origin.trim_end_matches('/');
        let session_request = CheckoutSessionRequest {
            product_name: room.name.clone(),
            product_description: format!("{} • {} to {}", room.location, booking.check_in, booking.check_out),
            unit_amount: to_minor_units(total_price),
            currency: self.currency.clone(),
            success_url: format!("{}/booking-success?session_id={{CHECKOUT_SESSION_ID}}", origin),
            cancel_url: format!("{}/booking-cancelled", origin),
            metadata: CorrelationMetadata::new(booking.id, identity.user_id, room.id),
        };

        let session = match self.provider.create_session(&session_request).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to create checkout session for booking {}: {}", booking.id, e);
                self.release_orphaned_booking(booking.id).await;
                return Err(CheckoutError::Upstream(e.to_string()));
            }
        };

        // 6. Pending payment correlated by the session id
        self.payments
            .create_payment(&NewPayment {
                booking_id: booking.id,
                user_id: identity.user_id,
                session_id: session.id.clone(),
                amount: total_price,
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to create payment record for session {}: {}", session.id, e);
                CheckoutError::Persistence(e.to_string())
            })?;

        tracing::info!("Checkout session {} opened for booking {}", session.id, booking.id);

        // 7. Redirect target
        Ok(CheckoutResponse {
            session_id: session.id,
            session_url: session.url,
        })
    }

    /// The booking was inserted but no session exists for it. Close it so it
    /// does not sit in `pending` forever; failure here is only logged.
    async fn release_orphaned_booking(&self, booking_id: Uuid) {
        match self.bookings.transition_booking(booking_id, BookingStatus::Cancelled).await {
            Ok(true) => log_event(
                "booking.cancelled",
                &BookingCancelledEvent {
                    booking_id,
                    session_id: None,
                    reason: "checkout session could not be created".to_string(),
                    timestamp: chrono::Utc::now().timestamp(),
                },
            ),
            Ok(false) => tracing::warn!("Orphaned booking {} was no longer pending", booking_id),
            Err(e) => tracing::error!("Failed to release orphaned booking {}: {}", booking_id, e),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, CheckoutError> {
    let value = value.trim();
    // Accept plain dates as well as full ISO timestamps
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| CheckoutError::Validation(format!("Invalid date: {}", value)))
}

pub(crate) fn log_event<T: Serialize>(name: &str, event: &T) {
    match serde_json::to_string(event) {
        Ok(payload) => tracing::info!(event = name, %payload, "domain event"),
        Err(e) => tracing::warn!("Failed to serialize {} event: {}", name, e),
    }
}
