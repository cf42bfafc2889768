use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use boxing24_core::{
    availability::{parse_date, parse_time_of_day, resolve_slot},
    errors::BookingError,
    models::slot::{CreateSlotBlockRequest, SlotBlockResponse},
};
use boxing24_db::{models::NewSlotBlock, InsertOutcome};
use tracing::info;
use uuid::Uuid;

use crate::{
    handlers::{booking::start_of_today, settings::load_settings},
    middleware::error_handling::AppError,
    ApiState,
};

/// Takes a slot out of the coach's availability.
///
/// # Errors
///
/// * `BookingError::Validation` - Malformed date/time or a time off the grid
/// * `BookingError::Conflict` - The slot already holds a booking or a block
#[axum::debug_handler]
pub async fn create_slot_block(
    State(state): State<Arc<ApiState>>,
    Path(coach_id): Path<Uuid>,
    Json(payload): Json<CreateSlotBlockRequest>,
) -> Result<(StatusCode, Json<SlotBlockResponse>), AppError> {
    let date = parse_date(&payload.date)?;
    let time = parse_time_of_day(&payload.time)?;
    let reason = payload
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    let settings = load_settings(&state, coach_id).await?;
    let window = settings.work_window()?;
    let start_time = resolve_slot(date, time, window, state.slot_minutes, state.timezone)?;

    let outcome = state
        .store
        .create_slot_block(NewSlotBlock {
            coach_id,
            start_time,
            reason,
        })
        .await
        .map_err(BookingError::Database)?;

    let block = match outcome {
        InsertOutcome::Inserted(block) => block,
        InsertOutcome::SlotTaken => {
            return Err(AppError(BookingError::Conflict(format!(
                "Slot {} {} is already booked or blocked",
                payload.date.trim(),
                payload.time.trim()
            ))));
        }
    };

    info!("Coach {} blocked slot {}", coach_id, block.start_time);

    Ok((StatusCode::CREATED, Json(block.into())))
}

/// Returns a blocked slot to the coach's availability.
#[axum::debug_handler]
pub async fn delete_slot_block(
    State(state): State<Arc<ApiState>>,
    Path((coach_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .store
        .delete_slot_block(coach_id, id)
        .await
        .map_err(BookingError::Database)?;

    if !deleted {
        return Err(AppError(BookingError::NotFound(format!(
            "Slot block with ID {} not found",
            id
        ))));
    }

    info!("Coach {} removed slot block {}", coach_id, id);
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_slot_blocks(
    State(state): State<Arc<ApiState>>,
    Path(coach_id): Path<Uuid>,
) -> Result<Json<Vec<SlotBlockResponse>>, AppError> {
    let from = start_of_today(&state)?;

    let blocks = state
        .store
        .get_slot_blocks_from(coach_id, from)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(blocks.into_iter().map(SlotBlockResponse::from).collect()))
}
