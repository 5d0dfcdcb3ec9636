use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::slot::Interval;

/// Lifecycle state of a reservation.
///
/// Allowed transitions: `pending -> confirmed -> completed`, and both
/// `pending` and `confirmed` may move to `cancelled`. `cancelled` and
/// `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Cancelled | ReservationStatus::Completed
        )
    }

    /// Whether the state machine permits moving from `self` to `next`.
    /// Staying in the same state is always allowed.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        if *self == next {
            return true;
        }
        match (*self, next) {
            (ReservationStatus::Pending, ReservationStatus::Confirmed) => true,
            (ReservationStatus::Pending, ReservationStatus::Cancelled) => true,
            (ReservationStatus::Confirmed, ReservationStatus::Completed) => true,
            (ReservationStatus::Confirmed, ReservationStatus::Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "completed" => Ok(ReservationStatus::Completed),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub status: ReservationStatus,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "tableId")]
    pub table_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.time_start,
            end: self.time_end,
        }
    }
}

/// Booking request body. Fields arrive as strings and are validated by the
/// handler so that missing or malformed input maps to a validation error
/// rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub date: Option<String>,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    #[serde(rename = "tableId")]
    pub table_id: Option<String>,
}

/// Partial update for a reservation. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateReservationRequest {
    pub date: Option<NaiveDate>,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub status: Option<ReservationStatus>,
    #[serde(rename = "tableId")]
    pub table_id: Option<Uuid>,
}

impl UpdateReservationRequest {
    /// Whether the patch touches the booked slot (table, date, or times).
    pub fn changes_slot(&self) -> bool {
        self.date.is_some()
            || self.time_start.is_some()
            || self.time_end.is_some()
            || self.table_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub message: String,
    pub reservation: Reservation,
}

/// A conflicting booking reported by the availability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictInfo {
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    pub table: TableSummary,
    pub conflict: Option<ConflictInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSummary {
    pub id: Uuid,
    pub table_number: i32,
    pub status: crate::models::table::TableStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRef {
    pub id: Uuid,
    pub table_number: i32,
    pub status: crate::models::table::TableStatus,
}

/// A reservation joined with its owning user and table, as returned by the
/// listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
    pub table: TableRef,
}
