use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::{eyre, Result};
use uuid::Uuid;

use boxing24_core::{
    availability::WorkWindow,
    models::{
        booking::{Booking, BookingStatus},
        coach_settings::CoachSettings,
        slot::SlotException,
    },
};

use crate::{
    models::{NewBooking, NewSlotBlock},
    store::{BookingStore, InsertOutcome},
};

#[derive(Default)]
struct MemoryState {
    settings: HashMap<Uuid, CoachSettings>,
    bookings: Vec<Booking>,
    blocks: Vec<SlotException>,
}

impl MemoryState {
    fn slot_taken(&self, coach_id: Uuid, start_time: DateTime<Utc>) -> bool {
        self.bookings
            .iter()
            .any(|b| b.coach_id == coach_id && b.start_time == start_time && b.is_active())
            || self
                .blocks
                .iter()
                .any(|b| b.coach_id == coach_id && b.start_time == start_time)
    }
}

/// In-process store. The occupancy check and the insert happen under one
/// lock, so it offers the same guarantee as the conditional insert in
/// Postgres.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| eyre!("memory store lock poisoned"))
    }
}

fn sorted_by_start<T>(mut items: Vec<T>, start: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    items.sort_by_key(|item| start(item));
    items
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn get_coach_settings(&self, coach_id: Uuid) -> Result<Option<CoachSettings>> {
        Ok(self.state()?.settings.get(&coach_id).cloned())
    }

    async fn save_coach_settings(
        &self,
        coach_id: Uuid,
        window: WorkWindow,
        google_calendar_id: Option<String>,
    ) -> Result<CoachSettings> {
        let settings = CoachSettings {
            coach_id,
            work_start_time: window.start(),
            work_end_time: window.end(),
            google_calendar_id,
            updated_at: Some(Utc::now()),
        };
        self.state()?.settings.insert(coach_id, settings.clone());
        Ok(settings)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self.state()?.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn get_active_bookings_from(
        &self,
        coach_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let bookings = self
            .state()?
            .bookings
            .iter()
            .filter(|b| b.coach_id == coach_id && b.is_active() && b.start_time >= from)
            .cloned()
            .collect();
        Ok(sorted_by_start(bookings, |b: &Booking| b.start_time))
    }

    async fn get_active_bookings_between(
        &self,
        coach_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let bookings = self
            .state()?
            .bookings
            .iter()
            .filter(|b| {
                b.coach_id == coach_id
                    && b.is_active()
                    && b.start_time >= start
                    && b.start_time < end
            })
            .cloned()
            .collect();
        Ok(sorted_by_start(bookings, |b: &Booking| b.start_time))
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<InsertOutcome<Booking>> {
        let mut state = self.state()?;
        if state.slot_taken(booking.coach_id, booking.start_time) {
            return Ok(InsertOutcome::SlotTaken);
        }

        let created = Booking {
            id: Uuid::new_v4(),
            coach_id: booking.coach_id,
            start_time: booking.start_time,
            status: BookingStatus::Confirmed,
            client_name: booking.client_name,
            client_email: booking.client_email,
            client_phone: booking.client_phone,
            notes: booking.notes,
            cancellation_reason: None,
            cancelled_at: None,
            created_at: Utc::now(),
        };
        state.bookings.push(created.clone());
        Ok(InsertOutcome::Inserted(created))
    }

    async fn cancel_booking(&self, id: Uuid, reason: String) -> Result<Option<Booking>> {
        let mut state = self.state()?;
        let Some(booking) = state
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.is_active())
        else {
            return Ok(None);
        };

        booking.status = BookingStatus::Cancelled;
        booking.cancellation_reason = Some(reason);
        booking.cancelled_at = Some(Utc::now());
        Ok(Some(booking.clone()))
    }

    async fn get_slot_blocks_from(
        &self,
        coach_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<SlotException>> {
        let blocks = self
            .state()?
            .blocks
            .iter()
            .filter(|b| b.coach_id == coach_id && b.start_time >= from)
            .cloned()
            .collect();
        Ok(sorted_by_start(blocks, |b: &SlotException| b.start_time))
    }

    async fn get_slot_blocks_between(
        &self,
        coach_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SlotException>> {
        let blocks = self
            .state()?
            .blocks
            .iter()
            .filter(|b| b.coach_id == coach_id && b.start_time >= start && b.start_time < end)
            .cloned()
            .collect();
        Ok(sorted_by_start(blocks, |b: &SlotException| b.start_time))
    }

    async fn create_slot_block(&self, block: NewSlotBlock) -> Result<InsertOutcome<SlotException>> {
        let mut state = self.state()?;
        if state.slot_taken(block.coach_id, block.start_time) {
            return Ok(InsertOutcome::SlotTaken);
        }

        let created = SlotException {
            id: Uuid::new_v4(),
            coach_id: block.coach_id,
            start_time: block.start_time,
            reason: block.reason,
            created_at: Utc::now(),
        };
        state.blocks.push(created.clone());
        Ok(InsertOutcome::Inserted(created))
    }

    async fn delete_slot_block(&self, coach_id: Uuid, id: Uuid) -> Result<bool> {
        let mut state = self.state()?;
        let before = state.blocks.len();
        state.blocks.retain(|b| !(b.id == id && b.coach_id == coach_id));
        Ok(state.blocks.len() < before)
    }
}
