use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use crate::booking::BookingStatus;
use crate::{CoreError, CoreResult};

/// Payment attempt status, kept in lockstep with the booking it pays for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }

    /// Settling only ever moves a `pending` payment to a terminal status
    pub fn settlement_target(self) -> CoreResult<Self> {
        if self.is_terminal() {
            Ok(self)
        } else {
            Err(CoreError::InvalidTransition {
                from: PaymentStatus::Pending.to_string(),
                to: self.to_string(),
            })
        }
    }

    /// The booking status this payment status is paired with
    pub fn booking_status(&self) -> BookingStatus {
        match self {
            PaymentStatus::Pending => BookingStatus::Pending,
            PaymentStatus::Completed => BookingStatus::Confirmed,
            PaymentStatus::Failed => BookingStatus::Cancelled,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub session_id: String, // Provider's checkout session ID (e.g., cs_123)
    pub amount: f64,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub session_id: String,
    pub amount: f64,
}

impl NewPayment {
    pub fn into_payment(self, id: Uuid, created_at: DateTime<Utc>) -> Payment {
        Payment {
            id,
            booking_id: self.booking_id,
            user_id: self.user_id,
            session_id: self.session_id,
            amount: self.amount,
            status: PaymentStatus::Pending,
            created_at,
        }
    }
}

/// Convert a major-unit amount to integer minor units (cents), rounding to
/// the nearest cent.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Identifiers attached to a checkout session so that the asynchronous
/// completion event can be mapped back to internal records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorrelationMetadata {
    pub booking_id: Option<String>,
    pub user_id: Option<String>,
    pub room_id: Option<String>,
}

impl CorrelationMetadata {
    pub fn new(booking_id: Uuid, user_id: Uuid, room_id: Uuid) -> Self {
        Self {
            booking_id: Some(booking_id.to_string()),
            user_id: Some(user_id.to_string()),
            room_id: Some(room_id.to_string()),
        }
    }

    pub fn booking_id(&self) -> Option<Uuid> {
        self.booking_id.as_deref().and_then(|id| Uuid::parse_str(id).ok())
    }

    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("booking_id", self.booking_id.as_deref()),
            ("user_id", self.user_id.as_deref()),
            ("room_id", self.room_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
    }
}

/// A request for a single-line-item hosted checkout
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub product_name: String,
    pub product_description: String,
    pub unit_amount: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: CorrelationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Create a hosted checkout session with the provider
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, Box<dyn std::error::Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_round_to_nearest_cent() {
        assert_eq!(to_minor_units(450.0), 45000);
        assert_eq!(to_minor_units(19.99), 1999);
        assert_eq!(to_minor_units(0.125), 13);
        assert_eq!(to_minor_units(0.004), 0);
    }

    #[test]
    fn test_payment_status_mirrors_booking() {
        assert_eq!(PaymentStatus::Completed.booking_status(), BookingStatus::Confirmed);
        assert_eq!(PaymentStatus::Failed.booking_status(), BookingStatus::Cancelled);
        assert!(!PaymentStatus::Failed.can_transition_to(PaymentStatus::Completed));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
    }

    #[test]
    fn test_settlement_target_must_be_terminal() {
        assert_eq!(PaymentStatus::Completed.settlement_target().unwrap(), PaymentStatus::Completed);
        assert!(PaymentStatus::Pending.settlement_target().is_err());
    }

    #[test]
    fn test_correlation_metadata_entries() {
        let booking_id = Uuid::new_v4();
        let meta = CorrelationMetadata::new(booking_id, Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(meta.booking_id(), Some(booking_id));
        assert_eq!(meta.entries().len(), 3);

        let partial = CorrelationMetadata {
            booking_id: Some("not-a-uuid".into()),
            ..Default::default()
        };
        assert_eq!(partial.booking_id(), None);
        assert_eq!(partial.entries(), vec![("booking_id", "not-a-uuid")]);
    }
}
