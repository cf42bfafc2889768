use axum::http::StatusCode;
use chrono::NaiveTime;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use boxing24_core::models::slot::{SlotGridResponse, SlotStatus};

use crate::test_utils::{TestContext, FUTURE_DATE};

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn test_grid_uses_default_hours_without_settings() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get(&format!("/api/coaches/{}/slots", ctx.coach_id))
        .add_query_param("date", FUTURE_DATE)
        .await;

    response.assert_status_ok();
    let grid: SlotGridResponse = response.json();
    assert_eq!(grid.coach_id, ctx.coach_id);
    assert_eq!(grid.timezone, chrono_tz::Europe::Warsaw);
    assert_eq!(grid.slot_minutes, 60);
    assert_eq!(grid.slots.len(), 12);
    assert_eq!(grid.slots.first().map(|s| s.time), Some(hm(8, 0)));
    assert_eq!(grid.slots.last().map(|s| s.time), Some(hm(19, 0)));
    assert!(grid.slots.iter().all(|s| s.status.is_free()));
}

#[tokio::test]
async fn test_grid_labels_booked_and_blocked_slots() {
    let ctx = TestContext::new();
    let booking_id = ctx.book(FUTURE_DATE, "10:00").await;

    ctx.server
        .post(&format!("/api/coaches/{}/blocks", ctx.coach_id))
        .json(&json!({ "date": FUTURE_DATE, "time": "12:00", "reason": "Zawody" }))
        .await
        .assert_status(StatusCode::CREATED);

    let grid: SlotGridResponse = ctx
        .server
        .get(&format!("/api/coaches/{}/slots", ctx.coach_id))
        .add_query_param("date", FUTURE_DATE)
        .await
        .json();

    let status_at = |time: NaiveTime| {
        grid.slots
            .iter()
            .find(|s| s.time == time)
            .map(|s| s.status.clone())
            .unwrap()
    };

    assert_eq!(
        status_at(hm(10, 0)),
        SlotStatus::Booked {
            booking_id,
            client_name: "Anna Nowak".to_string(),
        }
    );
    assert!(matches!(
        status_at(hm(12, 0)),
        SlotStatus::Blocked { reason: Some(ref r), .. } if r == "Zawody"
    ));
    assert_eq!(grid.slots.iter().filter(|s| s.status.is_free()).count(), 10);
}

#[tokio::test]
async fn test_grid_only_shows_requested_coach() {
    let ctx = TestContext::new();
    ctx.book(FUTURE_DATE, "09:00").await;

    let other_coach = uuid::Uuid::new_v4();
    let grid: SlotGridResponse = ctx
        .server
        .get(&format!("/api/coaches/{}/slots", other_coach))
        .add_query_param("date", FUTURE_DATE)
        .await
        .json();

    assert!(grid.slots.iter().all(|s| s.status.is_free()));
}

#[tokio::test]
async fn test_grid_follows_saved_work_hours() {
    let ctx = TestContext::new();
    ctx.server
        .put(&format!("/api/coaches/{}/settings", ctx.coach_id))
        .json(&json!({ "work_start_time": "09:30", "work_end_time": "12:00" }))
        .await
        .assert_status_ok();

    let grid: SlotGridResponse = ctx
        .server
        .get(&format!("/api/coaches/{}/slots", ctx.coach_id))
        .add_query_param("date", FUTURE_DATE)
        .await
        .json();

    let times: Vec<NaiveTime> = grid.slots.iter().map(|s| s.time).collect();
    assert_eq!(times, vec![hm(9, 30), hm(10, 30), hm(11, 30)]);
}

#[tokio::test]
async fn test_grid_slot_minutes_override() {
    let ctx = TestContext::new();

    let grid: SlotGridResponse = ctx
        .server
        .get(&format!("/api/coaches/{}/slots", ctx.coach_id))
        .add_query_param("date", FUTURE_DATE)
        .add_query_param("slot_minutes", 30)
        .await
        .json();

    assert_eq!(grid.slot_minutes, 30);
    assert_eq!(grid.slots.len(), 24);
    assert_eq!(grid.slots[1].time, hm(8, 30));
}

#[tokio::test]
async fn test_grid_skips_spring_forward_gap() {
    let ctx = TestContext::new();
    ctx.server
        .put(&format!("/api/coaches/{}/settings", ctx.coach_id))
        .json(&json!({ "work_start_time": "01:00", "work_end_time": "04:00" }))
        .await
        .assert_status_ok();

    // 02:00-03:00 does not exist in Warsaw on this date
    let grid: SlotGridResponse = ctx
        .server
        .get(&format!("/api/coaches/{}/slots", ctx.coach_id))
        .add_query_param("date", "2099-03-29")
        .await
        .json();

    let times: Vec<NaiveTime> = grid.slots.iter().map(|s| s.time).collect();
    assert_eq!(times, vec![hm(1, 0), hm(3, 0)]);
}

#[tokio::test]
async fn test_grid_rejects_bad_query() {
    let ctx = TestContext::new();
    let path = format!("/api/coaches/{}/slots", ctx.coach_id);

    ctx.server
        .get(&path)
        .add_query_param("date", "05.01.2099")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .get(&path)
        .add_query_param("date", FUTURE_DATE)
        .add_query_param("slot_minutes", 0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[rstest]
#[case::longer_than_a_day(1441)]
#[case::overflowing_step(1_073_741_824)]
#[tokio::test]
async fn test_grid_rejects_oversized_slot_minutes(#[case] minutes: u32) {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get(&format!("/api/coaches/{}/slots", ctx.coach_id))
        .add_query_param("date", FUTURE_DATE)
        .add_query_param("slot_minutes", minutes)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<serde_json::Value>()["error"]
        .as_str()
        .unwrap()
        .contains("must not exceed"));
}

#[tokio::test]
async fn test_finer_grid_override_does_not_change_bookable_times() {
    let ctx = TestContext::new();

    let grid: SlotGridResponse = ctx
        .server
        .get(&format!("/api/coaches/{}/slots", ctx.coach_id))
        .add_query_param("date", FUTURE_DATE)
        .add_query_param("slot_minutes", 30)
        .await
        .json();
    assert!(grid.slots.iter().any(|s| s.time == hm(8, 30)));

    ctx.server
        .post("/api/bookings")
        .json(&ctx.booking_body(FUTURE_DATE, "08:30"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
