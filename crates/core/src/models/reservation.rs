use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::BookingError;

/// Lifecycle state of a reservation. Only `Confirmed` and `Completed`
/// occupy staff time; cancelled reservations are retained for history but
/// never block new bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Whether a reservation in this state blocks other bookings.
    pub fn occupies_time(&self) -> bool {
        matches!(self, ReservationStatus::Confirmed | ReservationStatus::Completed)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

impl FromStr for ReservationStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "completed" => Ok(ReservationStatus::Completed),
            other => Err(BookingError::InvalidRequest(format!(
                "unknown reservation status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub salon_id: Uuid,
    pub staff_id: Uuid,
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub notes: String,
    pub total_price: i32,
    pub created_at: DateTime<Utc>,
}

/// Booking request body. `date` and `start_time` combine into a single UTC
/// instant; the duration comes from the referenced service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub salon_id: Uuid,
    pub staff_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "crate::scheduling::hhmm")]
    pub start_time: NaiveTime,
    #[serde(default)]
    pub notes: String,
}

impl CreateReservationRequest {
    /// The requested start as a UTC instant.
    pub fn start(&self) -> DateTime<Utc> {
        self.date.and_time(self.start_time).and_utc()
    }
}

/// Reschedule request body. The reservation keeps its salon, staff and
/// service; only the interval (and optionally the notes) move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReservationRequest {
    pub date: NaiveDate,
    #[serde(with = "crate::scheduling::hhmm")]
    pub start_time: NaiveTime,
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdateReservationRequest {
    /// The requested new start as a UTC instant.
    pub fn start(&self) -> DateTime<Utc> {
        self.date.and_time(self.start_time).and_utc()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableSlotsResponse {
    /// Ascending start times formatted as `"HH:MM"`.
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelReservationResponse {
    pub message: String,
}
