use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use crate::{CoreError, CoreResult};

/// Booking status in the checkout lifecycle
///
/// ```text
/// pending --(session completed)--> confirmed   [terminal]
/// pending --(session expired)----> cancelled   [terminal]
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
        )
    }

    /// Settling only ever moves a `pending` booking to a terminal status
    pub fn settlement_target(self) -> CoreResult<Self> {
        if self.is_terminal() {
            Ok(self)
        } else {
            Err(CoreError::InvalidTransition {
                from: BookingStatus::Pending.to_string(),
                to: self.to_string(),
            })
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// A reservation of one room for a stay interval. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Apply a status change, rejecting anything the lifecycle does not allow
    pub fn transition(&mut self, next: BookingStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Insert payload for a booking; always created in `pending`
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: f64,
}

impl NewBooking {
    pub fn validate(&self) -> CoreResult<()> {
        if self.check_out <= self.check_in {
            return Err(CoreError::ValidationError(
                "Check-out date must be after check-in date".to_string(),
            ));
        }
        if !self.total_price.is_finite() || self.total_price <= 0.0 {
            return Err(CoreError::ValidationError("Total price must be positive".to_string()));
        }
        Ok(())
    }

    pub fn into_booking(self, id: Uuid, created_at: DateTime<Utc>) -> Booking {
        Booking {
            id,
            user_id: self.user_id,
            room_id: self.room_id,
            check_in: self.check_in,
            check_out: self.check_out,
            total_price: self.total_price,
            status: BookingStatus::Pending,
            created_at,
        }
    }
}
