use chrono::{DateTime, NaiveTime, Utc};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use boxing24_core::models::{
    booking::{Booking, BookingStatus},
    coach_settings::CoachSettings,
    slot::SlotException,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCoachSettings {
    pub coach_id: Uuid,
    pub work_start_time: NaiveTime,
    pub work_end_time: NaiveTime,
    pub google_calendar_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub status: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlotBlock {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a client reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub coach_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
}

/// Insert payload for a coach-initiated slot block.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSlotBlock {
    pub coach_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub reason: Option<String>,
}

impl From<DbCoachSettings> for CoachSettings {
    fn from(row: DbCoachSettings) -> Self {
        Self {
            coach_id: row.coach_id,
            work_start_time: row.work_start_time,
            work_end_time: row.work_end_time,
            google_calendar_id: row.google_calendar_id,
            updated_at: Some(row.updated_at),
        }
    }
}

impl TryFrom<DbBooking> for Booking {
    type Error = eyre::Report;

    fn try_from(row: DbBooking) -> Result<Self> {
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|e| eyre!("Booking {} has an unreadable status: {}", row.id, e))?;

        Ok(Self {
            id: row.id,
            coach_id: row.coach_id,
            start_time: row.start_time,
            status,
            client_name: row.client_name,
            client_email: row.client_email,
            client_phone: row.client_phone,
            notes: row.notes,
            cancellation_reason: row.cancellation_reason,
            cancelled_at: row.cancelled_at,
            created_at: row.created_at,
        })
    }
}

impl From<DbSlotBlock> for SlotException {
    fn from(row: DbSlotBlock) -> Self {
        Self {
            id: row.id,
            coach_id: row.coach_id,
            start_time: row.start_time,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}
