//! # Availability Handlers
//!
//! Builds a coach's slot grid for one day. The grid is computed on every
//! request from the coach's work window plus that day's confirmed bookings
//! and blocks; nothing about slots is stored.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use boxing24_core::{
    availability::{build_day_grid, day_bounds, parse_date},
    errors::BookingError,
    models::slot::SlotGridResponse,
};
use uuid::Uuid;

use crate::{handlers::settings::load_settings, middleware::error_handling::AppError, ApiState};

/// Query parameters for the slot grid endpoint
#[derive(Debug, Deserialize)]
pub struct SlotGridQuery {
    /// Local calendar date, `YYYY-MM-DD`
    pub date: String,

    /// Overrides the configured slot duration for this view only. Bookings
    /// and blocks are always placed on the configured grid, so a finer
    /// override can show starts that cannot be booked.
    pub slot_minutes: Option<u32>,
}

/// Returns every slot of the coach's working day labelled free, booked or
/// blocked.
///
/// # Endpoint
///
/// ```text
/// GET /api/coaches/:coach_id/slots?date=2026-02-14&slot_minutes=60
/// ```
///
/// # Errors
///
/// * `BookingError::Validation` - Malformed date, or a slot duration of zero
///   or longer than a day
/// * `BookingError::Configuration` - The stored work window is unusable
/// * `BookingError::Database` - Store failure
#[axum::debug_handler]
pub async fn get_slot_grid(
    State(state): State<Arc<ApiState>>,
    Path(coach_id): Path<Uuid>,
    Query(query): Query<SlotGridQuery>,
) -> Result<Json<SlotGridResponse>, AppError> {
    let date = parse_date(&query.date)?;
    let slot_minutes = query.slot_minutes.unwrap_or(state.slot_minutes);

    let settings = load_settings(&state, coach_id).await?;
    let window = settings.work_window()?;
    let (day_start, day_end) = day_bounds(date, state.timezone)?;

    let bookings = state
        .store
        .get_active_bookings_between(coach_id, day_start, day_end)
        .await
        .map_err(BookingError::Database)?;

    let blocks = state
        .store
        .get_slot_blocks_between(coach_id, day_start, day_end)
        .await
        .map_err(BookingError::Database)?;

    tracing::debug!(
        "Building grid for coach {} on {}: {} bookings, {} blocks",
        coach_id,
        date,
        bookings.len(),
        blocks.len()
    );

    let slots = build_day_grid(date, window, slot_minutes, state.timezone, &bookings, &blocks)?;

    Ok(Json(SlotGridResponse {
        coach_id,
        date,
        timezone: state.timezone,
        slot_minutes,
        slots,
    }))
}
