//! # Availability
//!
//! Slot generation and classification for a single coach and day.
//!
//! Work hours and slot labels are wall-clock times in one service-wide
//! timezone ([`DEFAULT_TIMEZONE`] unless configured otherwise); every stored
//! timestamp is UTC. A local time that is skipped by a DST transition yields
//! no slot, and an ambiguous one resolves to the earlier instant.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::{
    errors::{BookingError, BookingResult},
    models::{
        booking::Booking,
        slot::{Slot, SlotException, SlotStatus},
    },
};

/// Default slot granularity in minutes
pub const SLOT_MINUTES: u32 = 60;

/// Longest slot accepted: one full day
pub const MAX_SLOT_MINUTES: u32 = 24 * 60;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Warsaw;

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> BookingResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| BookingError::Validation(format!("Invalid time of day: '{}'", value)))
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::Validation(format!("Invalid date: '{}'", value.trim())))
}

/// A validated work-hour window with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl WorkWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> BookingResult<Self> {
        if end <= start {
            return Err(BookingError::Validation(format!(
                "Work end {} must be after work start {}",
                format_time_of_day(end),
                format_time_of_day(start)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> BookingResult<Self> {
        Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

/// Produces slot start times from work-start, stepping by `slot_minutes`,
/// strictly before work-end.
pub fn generate_slots(window: WorkWindow, slot_minutes: u32) -> BookingResult<Vec<NaiveTime>> {
    if slot_minutes == 0 {
        return Err(BookingError::Validation(
            "Slot duration must be at least one minute".to_string(),
        ));
    }
    if slot_minutes > MAX_SLOT_MINUTES {
        return Err(BookingError::Validation(format!(
            "Slot duration must not exceed {} minutes, got {}",
            MAX_SLOT_MINUTES, slot_minutes
        )));
    }

    let step = slot_minutes * 60;
    let end = window.end.num_seconds_from_midnight();
    let mut current = window.start.num_seconds_from_midnight();
    let mut slots = Vec::new();

    while current < end {
        // `current` stays below `end`, which is itself a valid time of day
        if let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(current, 0) {
            slots.push(time);
        }
        current += step;
    }

    Ok(slots)
}

/// Converts a local date and time to UTC. `None` when the local time does
/// not exist on that date.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// The half-open UTC range `[start, end)` covering `date` in `tz`.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> BookingResult<(DateTime<Utc>, DateTime<Utc>)> {
    let next = date
        .succ_opt()
        .ok_or_else(|| BookingError::Validation(format!("Date out of range: {}", date)))?;
    let start = local_to_utc(date, NaiveTime::MIN, tz);
    let end = local_to_utc(next, NaiveTime::MIN, tz);

    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(BookingError::Configuration(format!(
            "Midnight of {} does not exist in timezone {}",
            date, tz
        ))),
    }
}

/// Checks that `time` is one of the generated slots for the window and
/// returns its UTC start.
pub fn resolve_slot(
    date: NaiveDate,
    time: NaiveTime,
    window: WorkWindow,
    slot_minutes: u32,
    tz: Tz,
) -> BookingResult<DateTime<Utc>> {
    let slots = generate_slots(window, slot_minutes)?;
    if !slots.contains(&time) {
        return Err(BookingError::Validation(format!(
            "{} is not a bookable slot between {} and {}",
            format_time_of_day(time),
            format_time_of_day(window.start),
            format_time_of_day(window.end)
        )));
    }

    local_to_utc(date, time, tz).ok_or_else(|| {
        BookingError::Validation(format!(
            "{} {} does not exist in timezone {}",
            date,
            format_time_of_day(time),
            tz
        ))
    })
}

/// Minute-precision key for a local time of day.
fn minute_key(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Local minute-of-day for `instant` if it falls on `date` in `tz`.
fn local_minute_on(instant: DateTime<Utc>, date: NaiveDate, tz: Tz) -> Option<u32> {
    let local = instant.with_timezone(&tz);
    (local.date_naive() == date).then(|| minute_key(local.time()))
}

/// Labels each slot time as free, booked or blocked.
///
/// Bookings and blocks from other dates are ignored, as are cancelled
/// bookings. A block wins over a booking at the same minute.
pub fn classify_slots(
    date: NaiveDate,
    times: &[NaiveTime],
    bookings: &[Booking],
    blocks: &[SlotException],
    tz: Tz,
) -> Vec<Slot> {
    let booked: HashMap<u32, &Booking> = bookings
        .iter()
        .filter(|b| b.is_active())
        .filter_map(|b| local_minute_on(b.start_time, date, tz).map(|key| (key, b)))
        .collect();

    let blocked: HashMap<u32, &SlotException> = blocks
        .iter()
        .filter_map(|b| local_minute_on(b.start_time, date, tz).map(|key| (key, b)))
        .collect();

    times
        .iter()
        .filter_map(|&time| {
            let start_time = local_to_utc(date, time, tz)?;
            let key = minute_key(time);

            let status = if let Some(block) = blocked.get(&key) {
                SlotStatus::Blocked {
                    block_id: block.id,
                    reason: block.reason.clone(),
                }
            } else if let Some(booking) = booked.get(&key) {
                SlotStatus::Booked {
                    booking_id: booking.id,
                    client_name: booking.client_name.clone(),
                }
            } else {
                SlotStatus::Free
            };

            Some(Slot {
                time,
                start_time,
                status,
            })
        })
        .collect()
}

/// Generates and classifies the full grid for one day.
pub fn build_day_grid(
    date: NaiveDate,
    window: WorkWindow,
    slot_minutes: u32,
    tz: Tz,
    bookings: &[Booking],
    blocks: &[SlotException],
) -> BookingResult<Vec<Slot>> {
    let times = generate_slots(window, slot_minutes)?;
    Ok(classify_slots(date, &times, bookings, blocks, tz))
}
