pub mod booking;
pub mod coach_settings;
pub mod slot;
