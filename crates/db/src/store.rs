//! The storage seam used by the API.
//!
//! [`PgStore`] is the production implementation; [`crate::MemoryStore`]
//! keeps the same occupancy rules in process for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use mockall::automock;
use uuid::Uuid;

use boxing24_core::{
    availability::WorkWindow,
    models::{booking::Booking, coach_settings::CoachSettings, slot::SlotException},
};

use crate::{
    models::{NewBooking, NewSlotBlock},
    repositories, DbPool,
};

/// Result of a conditional insert into a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome<T> {
    Inserted(T),
    /// A confirmed booking or a block already occupies `(coach, start_time)`
    SlotTaken,
}

impl<T> InsertOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> InsertOutcome<U> {
        match self {
            InsertOutcome::Inserted(value) => InsertOutcome::Inserted(f(value)),
            InsertOutcome::SlotTaken => InsertOutcome::SlotTaken,
        }
    }
}

#[automock]
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get_coach_settings(&self, coach_id: Uuid) -> Result<Option<CoachSettings>>;

    async fn save_coach_settings(
        &self,
        coach_id: Uuid,
        window: WorkWindow,
        google_calendar_id: Option<String>,
    ) -> Result<CoachSettings>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>>;

    /// Confirmed bookings starting at or after `from`, ordered by start time.
    async fn get_active_bookings_from(
        &self,
        coach_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<Booking>>;

    /// Confirmed bookings in `[start, end)`, ordered by start time.
    async fn get_active_bookings_between(
        &self,
        coach_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>>;

    async fn create_booking(&self, booking: NewBooking) -> Result<InsertOutcome<Booking>>;

    /// `None` if the booking is missing or no longer confirmed.
    async fn cancel_booking(&self, id: Uuid, reason: String) -> Result<Option<Booking>>;

    async fn get_slot_blocks_from(
        &self,
        coach_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<SlotException>>;

    async fn get_slot_blocks_between(
        &self,
        coach_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SlotException>>;

    async fn create_slot_block(&self, block: NewSlotBlock) -> Result<InsertOutcome<SlotException>>;

    async fn delete_slot_block(&self, coach_id: Uuid, id: Uuid) -> Result<bool>;
}

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn get_coach_settings(&self, coach_id: Uuid) -> Result<Option<CoachSettings>> {
        let row = repositories::coach_settings::get_by_coach_id(&self.pool, coach_id).await?;
        Ok(row.map(CoachSettings::from))
    }

    async fn save_coach_settings(
        &self,
        coach_id: Uuid,
        window: WorkWindow,
        google_calendar_id: Option<String>,
    ) -> Result<CoachSettings> {
        let row = repositories::coach_settings::upsert(
            &self.pool,
            coach_id,
            window.start(),
            window.end(),
            google_calendar_id.as_deref(),
        )
        .await?;
        Ok(row.into())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        repositories::booking::get_by_id(&self.pool, id)
            .await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn get_active_bookings_from(
        &self,
        coach_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        repositories::booking::get_active_from(&self.pool, coach_id, from)
            .await?
            .into_iter()
            .map(Booking::try_from)
            .collect()
    }

    async fn get_active_bookings_between(
        &self,
        coach_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        repositories::booking::get_active_between(&self.pool, coach_id, start, end)
            .await?
            .into_iter()
            .map(Booking::try_from)
            .collect()
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<InsertOutcome<Booking>> {
        match repositories::booking::insert_if_free(&self.pool, &booking).await? {
            InsertOutcome::Inserted(row) => Ok(InsertOutcome::Inserted(Booking::try_from(row)?)),
            InsertOutcome::SlotTaken => Ok(InsertOutcome::SlotTaken),
        }
    }

    async fn cancel_booking(&self, id: Uuid, reason: String) -> Result<Option<Booking>> {
        repositories::booking::cancel(&self.pool, id, &reason)
            .await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn get_slot_blocks_from(
        &self,
        coach_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<SlotException>> {
        let rows = repositories::slot_block::get_from(&self.pool, coach_id, from).await?;
        Ok(rows.into_iter().map(SlotException::from).collect())
    }

    async fn get_slot_blocks_between(
        &self,
        coach_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SlotException>> {
        let rows = repositories::slot_block::get_between(&self.pool, coach_id, start, end).await?;
        Ok(rows.into_iter().map(SlotException::from).collect())
    }

    async fn create_slot_block(&self, block: NewSlotBlock) -> Result<InsertOutcome<SlotException>> {
        let outcome = repositories::slot_block::insert_if_free(&self.pool, &block).await?;
        Ok(outcome.map(SlotException::from))
    }

    async fn delete_slot_block(&self, coach_id: Uuid, id: Uuid) -> Result<bool> {
        repositories::slot_block::delete(&self.pool, coach_id, id).await
    }
}
