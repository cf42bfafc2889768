use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

use boxing24_core::models::coach_settings::CoachSettingsResponse;

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_defaults_before_first_save() {
    let ctx = TestContext::new();

    let settings: CoachSettingsResponse = ctx
        .server
        .get(&format!("/api/coaches/{}/settings", ctx.coach_id))
        .await
        .json();

    assert_eq!(settings.coach_id, ctx.coach_id);
    assert_eq!(settings.work_start_time, "08:00");
    assert_eq!(settings.work_end_time, "20:00");
    assert_eq!(settings.google_calendar_id, None);
    assert_eq!(settings.updated_at, None);
}

#[test_log::test(tokio::test)]
async fn test_save_then_load_settings() {
    let ctx = TestContext::new();
    let path = format!("/api/coaches/{}/settings", ctx.coach_id);

    let saved: CoachSettingsResponse = ctx
        .server
        .put(&path)
        .json(&json!({
            "work_start_time": "07:30",
            "work_end_time": "15:00:00",
            "google_calendar_id": "  coach@boxing24.pl "
        }))
        .await
        .json();

    assert_eq!(saved.work_start_time, "07:30");
    assert_eq!(saved.work_end_time, "15:00");
    assert_eq!(saved.google_calendar_id.as_deref(), Some("coach@boxing24.pl"));
    assert!(saved.updated_at.is_some());

    let loaded: CoachSettingsResponse = ctx.server.get(&path).await.json();
    assert_eq!(loaded.work_start_time, saved.work_start_time);
    assert_eq!(loaded.work_end_time, saved.work_end_time);
    assert_eq!(loaded.google_calendar_id, saved.google_calendar_id);

    // A second save replaces the first
    let replaced: CoachSettingsResponse = ctx
        .server
        .put(&path)
        .json(&json!({ "work_start_time": "10:00", "work_end_time": "18:00" }))
        .await
        .json();
    assert_eq!(replaced.work_start_time, "10:00");
    assert_eq!(replaced.google_calendar_id, None);
}

#[rstest]
#[case::end_before_start("18:00", "09:00")]
#[case::empty_window("09:00", "09:00")]
#[case::malformed("9am", "17:00")]
#[tokio::test]
async fn test_invalid_work_hours_are_rejected(#[case] start: &str, #[case] end: &str) {
    let ctx = TestContext::new();
    let path = format!("/api/coaches/{}/settings", ctx.coach_id);

    let response = ctx
        .server
        .put(&path)
        .json(&json!({ "work_start_time": start, "work_end_time": end }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());

    // Nothing was stored
    let settings: CoachSettingsResponse = ctx.server.get(&path).await.json();
    assert_eq!(settings.work_start_time, "08:00");
}
