use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use mockall::predicate::eq;
use serde_json::{json, Value};
use uuid::Uuid;

use boxing24_core::models::booking::{Booking, BookingStatus};
use boxing24_db::{store::MockBookingStore, InsertOutcome};

use crate::test_utils::{server_with_store, FUTURE_DATE};

fn confirmed_booking(coach_id: Uuid) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        coach_id,
        start_time: Utc.with_ymd_and_hms(2099, 1, 5, 9, 0, 0).unwrap(),
        status: BookingStatus::Confirmed,
        client_name: "Anna Nowak".to_string(),
        client_email: "anna@example.com".to_string(),
        client_phone: None,
        notes: None,
        cancellation_reason: None,
        cancelled_at: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let coach_id = Uuid::new_v4();
    let mut store = MockBookingStore::new();
    store
        .expect_get_coach_settings()
        .with(eq(coach_id))
        .returning(|_| Err(eyre::eyre!("connection refused")));

    let server = server_with_store(store);
    let response = server
        .get(&format!("/api/coaches/{}/slots", coach_id))
        .add_query_param("date", FUTURE_DATE)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Database error"));
}

#[tokio::test]
async fn test_invalid_booking_never_reaches_store() {
    let mut store = MockBookingStore::new();
    store.expect_get_coach_settings().never();
    store.expect_create_booking().never();

    let server = server_with_store(store);
    server
        .post("/api/bookings")
        .json(&json!({
            "coach_id": Uuid::new_v4(),
            "date": FUTURE_DATE,
            "time": "10:00",
            "client_name": "Anna Nowak",
            "client_email": "not-an-email"
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lost_insert_race_is_conflict() {
    let mut store = MockBookingStore::new();
    store.expect_get_coach_settings().returning(|_| Ok(None));
    store
        .expect_create_booking()
        .times(1)
        .returning(|_| Ok(InsertOutcome::SlotTaken));

    let server = server_with_store(store);
    server
        .post("/api/bookings")
        .json(&json!({
            "coach_id": Uuid::new_v4(),
            "date": FUTURE_DATE,
            "time": "10:00",
            "client_name": "Anna Nowak",
            "client_email": "anna@example.com"
        }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_concurrent_cancel_is_conflict() {
    let coach_id = Uuid::new_v4();
    let booking = confirmed_booking(coach_id);
    let booking_id = booking.id;

    let mut store = MockBookingStore::new();
    store
        .expect_get_booking()
        .with(eq(booking_id))
        .returning(move |_| Ok(Some(booking.clone())));
    // Another request cancelled it between the read and the update
    store
        .expect_cancel_booking()
        .times(1)
        .returning(|_, _| Ok(None));

    let server = server_with_store(store);
    server
        .post(&format!("/api/bookings/{}/cancel", booking_id))
        .json(&json!({ "coach_id": coach_id, "reason": "Sick" }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_missing_block_is_not_found() {
    let coach_id = Uuid::new_v4();
    let block_id = Uuid::new_v4();

    let mut store = MockBookingStore::new();
    store
        .expect_delete_slot_block()
        .with(eq(coach_id), eq(block_id))
        .times(1)
        .returning(|_, _| Ok(false));

    let server = server_with_store(store);
    server
        .delete(&format!("/api/coaches/{}/blocks/{}", coach_id, block_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
