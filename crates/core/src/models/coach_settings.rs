use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    availability::{format_time_of_day, WorkWindow},
    errors::{BookingError, BookingResult},
};

pub fn default_work_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).expect("08:00 is a valid time of day")
}

pub fn default_work_end() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 0, 0).expect("20:00 is a valid time of day")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachSettings {
    pub coach_id: Uuid,
    pub work_start_time: NaiveTime,
    pub work_end_time: NaiveTime,
    pub google_calendar_id: Option<String>,
    /// `None` for settings that were never saved
    pub updated_at: Option<DateTime<Utc>>,
}

impl CoachSettings {
    /// Settings used for a coach who has not saved any yet.
    pub fn default_for(coach_id: Uuid) -> Self {
        Self {
            coach_id,
            work_start_time: default_work_start(),
            work_end_time: default_work_end(),
            google_calendar_id: None,
            updated_at: None,
        }
    }

    /// Revalidates the stored window. Stored rows predating validation may
    /// still hold an inverted window, which is a configuration problem.
    pub fn work_window(&self) -> BookingResult<WorkWindow> {
        WorkWindow::new(self.work_start_time, self.work_end_time).map_err(|e| {
            BookingError::Configuration(format!(
                "Coach {} has an invalid work window: {}",
                self.coach_id, e
            ))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCoachSettingsRequest {
    pub work_start_time: String,
    pub work_end_time: String,
    pub google_calendar_id: Option<String>,
}

impl SaveCoachSettingsRequest {
    /// Parses the window and normalises a blank calendar id to `None`.
    pub fn validate(&self) -> BookingResult<(WorkWindow, Option<String>)> {
        let window = WorkWindow::parse(&self.work_start_time, &self.work_end_time)?;
        let calendar_id = self
            .google_calendar_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        Ok((window, calendar_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachSettingsResponse {
    pub coach_id: Uuid,
    /// `HH:MM`
    pub work_start_time: String,
    /// `HH:MM`
    pub work_end_time: String,
    pub google_calendar_id: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CoachSettings> for CoachSettingsResponse {
    fn from(settings: CoachSettings) -> Self {
        Self {
            coach_id: settings.coach_id,
            work_start_time: format_time_of_day(settings.work_start_time),
            work_end_time: format_time_of_day(settings.work_end_time),
            google_calendar_id: settings.google_calendar_id,
            updated_at: settings.updated_at,
        }
    }
}
