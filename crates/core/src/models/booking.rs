use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};

/// Lifecycle of a client reservation. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Returns the status after a cancellation, or a conflict if the booking
    /// has already left the `confirmed` state.
    pub fn cancel(self) -> BookingResult<BookingStatus> {
        match self {
            BookingStatus::Confirmed => Ok(BookingStatus::Cancelled),
            BookingStatus::Cancelled => Err(BookingError::Conflict(
                "Booking is already cancelled".to_string(),
            )),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(BookingError::Validation(format!(
                "Unknown booking status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub coach_id: Uuid,
    /// Local calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Local wall-clock time, `HH:MM`
    pub time: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
}

/// Client details that passed validation, trimmed and with blank optionals
/// collapsed to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl CreateBookingRequest {
    /// Checks the required client fields. Runs before any store access.
    pub fn client_details(&self) -> BookingResult<ClientDetails> {
        let name = self.client_name.trim();
        if name.is_empty() {
            return Err(BookingError::Validation(
                "client_name is required".to_string(),
            ));
        }

        let email = self.client_email.trim();
        if email.is_empty() {
            return Err(BookingError::Validation(
                "client_email is required".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(BookingError::Validation(format!(
                "client_email is not a valid address: {}",
                email
            )));
        }

        Ok(ClientDetails {
            name: name.to_string(),
            email: email.to_string(),
            phone: non_blank(self.client_phone.as_deref()),
            notes: non_blank(self.notes.as_deref()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    pub coach_id: Uuid,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            coach_id: booking.coach_id,
            start_time: booking.start_time,
            status: booking.status,
            client_name: booking.client_name,
            client_email: booking.client_email,
            client_phone: booking.client_phone,
            notes: booking.notes,
            cancellation_reason: booking.cancellation_reason,
            created_at: booking.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingResponse {
    pub booking: BookingResponse,
    /// False when the client notification could not be delivered. The
    /// cancellation stands either way.
    pub notification_sent: bool,
}
