use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A coach-initiated exclusion of one slot. Unlike a booking it carries no
/// client contact data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotException {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotStatus {
    Free,
    Booked {
        booking_id: Uuid,
        client_name: String,
    },
    Blocked {
        block_id: Uuid,
        reason: Option<String>,
    },
}

impl SlotStatus {
    pub fn is_free(&self) -> bool {
        matches!(self, SlotStatus::Free)
    }
}

/// A derived, non-persisted candidate appointment time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Local wall-clock time in the service timezone
    pub time: NaiveTime,
    pub start_time: DateTime<Utc>,
    #[serde(flatten)]
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotGridResponse {
    pub coach_id: Uuid,
    pub date: NaiveDate,
    pub timezone: Tz,
    pub slot_minutes: u32,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotBlockRequest {
    /// Local calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Local wall-clock time, `HH:MM`
    pub time: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotBlockResponse {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SlotException> for SlotBlockResponse {
    fn from(block: SlotException) -> Self {
        Self {
            id: block.id,
            coach_id: block.coach_id,
            start_time: block.start_time,
            reason: block.reason,
            created_at: block.created_at,
        }
    }
}
