use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use boxing24_core::{
    availability::{day_bounds, parse_date, parse_time_of_day, resolve_slot},
    errors::{BookingError, BookingResult},
    models::booking::{
        Booking, BookingResponse, CancelBookingRequest, CancelBookingResponse,
        CreateBookingRequest,
    },
    services::CancellationNotice,
};
use boxing24_db::{models::NewBooking, InsertOutcome};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{handlers::settings::load_settings, middleware::error_handling::AppError, ApiState};

/// Start of the current local day, in UTC.
pub(crate) fn start_of_today(state: &ApiState) -> BookingResult<DateTime<Utc>> {
    let today = Utc::now().with_timezone(&state.timezone).date_naive();
    Ok(day_bounds(today, state.timezone)?.0)
}

/// Reserves a slot for a client.
///
/// # Endpoint
///
/// ```text
/// POST /api/bookings
/// ```
///
/// # Errors
///
/// * `BookingError::Validation` - Missing client fields, malformed date/time,
///   a time off the coach's grid, or a slot in the past
/// * `BookingError::Conflict` - The slot already holds a booking or a block
/// * `BookingError::Database` - Store failure
#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    // Validate everything that needs no store access first
    let client = payload.client_details()?;
    let date = parse_date(&payload.date)?;
    let time = parse_time_of_day(&payload.time)?;

    let settings = load_settings(&state, payload.coach_id).await?;
    let window = settings.work_window()?;
    let start_time = resolve_slot(date, time, window, state.slot_minutes, state.timezone)?;

    if start_time <= Utc::now() {
        return Err(AppError(BookingError::Validation(format!(
            "Slot {} {} has already started",
            payload.date.trim(),
            payload.time.trim()
        ))));
    }

    let outcome = state
        .store
        .create_booking(NewBooking {
            coach_id: payload.coach_id,
            start_time,
            client_name: client.name,
            client_email: client.email,
            client_phone: client.phone,
            notes: client.notes,
        })
        .await
        .map_err(BookingError::Database)?;

    let booking = match outcome {
        InsertOutcome::Inserted(booking) => booking,
        InsertOutcome::SlotTaken => {
            return Err(AppError(BookingError::Conflict(format!(
                "Slot {} {} is no longer available",
                payload.date.trim(),
                payload.time.trim()
            ))));
        }
    };

    info!(
        "Booking {} created for coach {} at {}",
        booking.id, booking.coach_id, booking.start_time
    );

    if let Some(calendar_id) = settings.google_calendar_id.as_deref() {
        if let Err(e) = state.calendar.booking_created(calendar_id, &booking).await {
            warn!("Calendar sync failed for booking {}: {:#}", booking.id, e);
        }
    }

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Cancels a confirmed booking, then notifies the client.
///
/// The cancellation is committed before any notification is attempted; a
/// failed notification is logged and reported through `notification_sent`.
///
/// # Endpoint
///
/// ```text
/// POST /api/bookings/:id/cancel
/// ```
#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    let existing = state
        .store
        .get_booking(id)
        .await
        .map_err(BookingError::Database)?
        .filter(|b| b.coach_id == payload.coach_id)
        .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {} not found", id)))?;

    existing.status.cancel()?;

    let reason = payload.reason.trim().to_string();
    let booking = state
        .store
        .cancel_booking(id, reason.clone())
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::Conflict("Booking is already cancelled".to_string()))?;

    info!("Booking {} cancelled by coach {}", booking.id, booking.coach_id);

    let notice = CancellationNotice {
        booking: booking.clone(),
        reason,
    };
    let notification_sent = match state.notifier.booking_cancelled(&notice).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Cancellation notice for booking {} failed: {:#}", booking.id, e);
            false
        }
    };

    sync_cancellation(&state, &booking).await;

    Ok(Json(CancelBookingResponse {
        booking: booking.into(),
        notification_sent,
    }))
}

/// Mirrors a cancellation into the coach's calendar. Never fails the caller.
async fn sync_cancellation(state: &ApiState, booking: &Booking) {
    let settings = match state.store.get_coach_settings(booking.coach_id).await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(
                "Skipping calendar sync for booking {}, settings unavailable: {:#}",
                booking.id, e
            );
            return;
        }
    };

    let Some(calendar_id) = settings.and_then(|s| s.google_calendar_id) else {
        return;
    };

    if let Err(e) = state.calendar.booking_cancelled(&calendar_id, booking).await {
        warn!("Calendar sync failed for cancelled booking {}: {:#}", booking.id, e);
    }
}

/// Confirmed bookings from the start of today onwards, earliest first.
#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<ApiState>>,
    Path(coach_id): Path<Uuid>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let from = start_of_today(&state)?;

    let bookings = state
        .store
        .get_active_bookings_from(coach_id, from)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}
