mod repository;

pub use repository::*;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status `{other}`")),
        }
    }
}

/// Booking as saved on database.
///
/// `user_id` and `flight_id` are stored as given; nothing checks they exist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Data required to insert a [`Booking`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
}

/// Fields updated when set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookingChanges {
    pub booking_date: Option<DateTime<Utc>>,
    pub status: Option<BookingStatus>,
}

impl BookingChanges {
    /// Apply set fields onto `booking`.
    pub fn apply(&self, booking: &mut Booking) {
        if let Some(date) = self.booking_date {
            booking.booking_date = date;
        }
        if let Some(status) = self.status {
            booking.status = status;
        }
    }
}
