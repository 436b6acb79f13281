use std::sync::Arc;
use uuid::Uuid;
use holostay_core::payment::PaymentStatus;
use holostay_core::repository::{BookingRepository, PaymentRepository};
use holostay_shared::models::events::{BookingCancelledEvent, BookingConfirmedEvent};
use crate::events::{EventKind, ProviderEvent};
use crate::initiator::log_event;
use crate::signature::{SignatureError, WebhookVerifier};

/// Reasons a delivery is refused. Anything past signature and envelope
/// checks is acknowledged.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("Invalid payload")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A checkout session event was applied (or found already applied)
    Applied {
        kind: EventKind,
        session_id: String,
        booking_id: Option<Uuid>,
        payment_updated: bool,
        booking_updated: bool,
    },
    /// Acknowledged with no state change
    Ignored { event_type: String },
}

/// Applies provider payment events to the booking and payment stores
pub struct PaymentReconciler {
    verifier: WebhookVerifier,
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl PaymentReconciler {
    pub fn new(
        verifier: WebhookVerifier,
        bookings: Arc<dyn BookingRepository>,
        payments: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self { verifier, bookings, payments }
    }

    pub async fn handle(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        if let Err(e) = self.verifier.verify(payload, signature, now) {
            match &e {
                SignatureError::Missing => tracing::warn!("Webhook delivered without signature"),
                SignatureError::Invalid { reason } => {
                    tracing::error!("Webhook signature verification failed: {}", reason)
                }
            }
            return Err(e.into());
        }

        let event = ProviderEvent::parse(payload).map_err(|e| {
            tracing::error!("Webhook payload could not be decoded: {}", e);
            e
        })?;

        let status = match event.kind() {
            EventKind::SessionCompleted => PaymentStatus::Completed,
            EventKind::SessionExpired => PaymentStatus::Failed,
            EventKind::Other(event_type) => {
                tracing::info!("Unhandled event type: {}", event_type);
                return Ok(ReconcileOutcome::Ignored { event_type });
            }
        };

        let session = event.session()?;
        let raw_booking_id = match session.metadata.as_ref().and_then(|m| m.booking_id.clone()) {
            Some(id) => id,
            None => {
                tracing::warn!("Session {} carries no booking_id metadata; nothing to reconcile", session.id);
                return Ok(ReconcileOutcome::Ignored { event_type: event.type_ });
            }
        };

        let payment_updated = self.settle_payment(&session.id, status).await;

        let booking_id = Uuid::parse_str(&raw_booking_id).ok();
        let booking_updated = match booking_id {
            Some(id) => self.settle_booking(id, &session.id, status).await,
            None => {
                tracing::error!("Session {} has malformed booking_id metadata: {}", session.id, raw_booking_id);
                false
            }
        };

        match status {
            PaymentStatus::Completed => tracing::info!("Payment completed for booking {}", raw_booking_id),
            _ => tracing::info!("Payment expired for booking {}", raw_booking_id),
        }

        Ok(ReconcileOutcome::Applied {
            kind: event.kind(),
            session_id: session.id,
            booking_id,
            payment_updated,
            booking_updated,
        })
    }

    /// Failures are logged and swallowed so the delivery is still acknowledged
    async fn settle_payment(&self, session_id: &str, status: PaymentStatus) -> bool {
        match self.payments.transition_payment(session_id, status).await {
            Ok(true) => true,
            Ok(false) => {
                tracing::info!("Payment for session {} not pending; {} not applied", session_id, status);
                false
            }
            Err(e) => {
                tracing::error!("Failed to update payment status: {}", e);
                false
            }
        }
    }

    async fn settle_booking(&self, booking_id: Uuid, session_id: &str, status: PaymentStatus) -> bool {
        let target = status.booking_status();
        match self.bookings.transition_booking(booking_id, target).await {
            Ok(true) => {
                let now = chrono::Utc::now().timestamp();
                match status {
                    PaymentStatus::Completed => log_event(
                        "booking.confirmed",
                        &BookingConfirmedEvent {
                            booking_id,
                            session_id: session_id.to_string(),
                            timestamp: now,
                        },
                    ),
                    _ => log_event(
                        "booking.cancelled",
                        &BookingCancelledEvent {
                            booking_id,
                            session_id: Some(session_id.to_string()),
                            reason: "checkout session expired".to_string(),
                            timestamp: now,
                        },
                    ),
                }
                true
            }
            Ok(false) => {
                tracing::info!("Booking {} not pending; {} not applied", booking_id, target);
                false
            }
            Err(e) => {
                tracing::error!("Failed to update booking status: {}", e);
                false
            }
        }
    }
}
