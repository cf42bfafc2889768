use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use boxing24_core::{
    errors::{BookingError, BookingResult},
    models::coach_settings::{CoachSettings, CoachSettingsResponse, SaveCoachSettingsRequest},
};
use tracing::info;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Stored settings for the coach, or the defaults if none were saved.
pub(crate) async fn load_settings(state: &ApiState, coach_id: Uuid) -> BookingResult<CoachSettings> {
    let settings = state
        .store
        .get_coach_settings(coach_id)
        .await
        .map_err(BookingError::Database)?
        .unwrap_or_else(|| CoachSettings::default_for(coach_id));

    Ok(settings)
}

#[axum::debug_handler]
pub async fn get_settings(
    State(state): State<Arc<ApiState>>,
    Path(coach_id): Path<Uuid>,
) -> Result<Json<CoachSettingsResponse>, AppError> {
    let settings = load_settings(&state, coach_id).await?;
    Ok(Json(settings.into()))
}

#[axum::debug_handler]
pub async fn save_settings(
    State(state): State<Arc<ApiState>>,
    Path(coach_id): Path<Uuid>,
    Json(payload): Json<SaveCoachSettingsRequest>,
) -> Result<Json<CoachSettingsResponse>, AppError> {
    // Reject malformed windows before touching the store
    let (window, google_calendar_id) = payload.validate()?;

    let settings = state
        .store
        .save_coach_settings(coach_id, window, google_calendar_id)
        .await
        .map_err(BookingError::Database)?;

    info!(
        "Saved settings for coach {}: {}-{}",
        coach_id, settings.work_start_time, settings.work_end_time
    );

    Ok(Json(settings.into()))
}
