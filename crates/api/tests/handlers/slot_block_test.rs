use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use boxing24_core::models::slot::SlotBlockResponse;

use crate::test_utils::{TestContext, FUTURE_DATE};

#[tokio::test]
async fn test_create_and_list_slot_blocks() {
    let ctx = TestContext::new();
    let path = format!("/api/coaches/{}/blocks", ctx.coach_id);

    let response = ctx
        .server
        .post(&path)
        .json(&json!({ "date": FUTURE_DATE, "time": "14:00", "reason": "  Sparring camp " }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let block: SlotBlockResponse = response.json();
    assert_eq!(block.reason.as_deref(), Some("Sparring camp"));
    assert_eq!(block.start_time.to_rfc3339(), "2099-01-05T13:00:00+00:00");

    let blank: SlotBlockResponse = ctx
        .server
        .post(&path)
        .json(&json!({ "date": FUTURE_DATE, "time": "08:00", "reason": "   " }))
        .await
        .json();
    assert_eq!(blank.reason, None);

    let blocks: Vec<SlotBlockResponse> = ctx.server.get(&path).await.json();
    let ids: Vec<Uuid> = blocks.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![blank.id, block.id]);
}

#[tokio::test]
async fn test_block_over_booking_conflicts() {
    let ctx = TestContext::new();
    ctx.book(FUTURE_DATE, "14:00").await;

    let response = ctx
        .server
        .post(&format!("/api/coaches/{}/blocks", ctx.coach_id))
        .json(&json!({ "date": FUTURE_DATE, "time": "14:00" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("already booked or blocked"));
}

#[tokio::test]
async fn test_block_twice_conflicts() {
    let ctx = TestContext::new();
    let path = format!("/api/coaches/{}/blocks", ctx.coach_id);
    let body = json!({ "date": FUTURE_DATE, "time": "14:00" });

    ctx.server.post(&path).json(&body).await.assert_status(StatusCode::CREATED);
    ctx.server.post(&path).json(&body).await.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_block_off_grid_is_rejected() {
    let ctx = TestContext::new();

    ctx.server
        .post(&format!("/api/coaches/{}/blocks", ctx.coach_id))
        .json(&json!({ "date": FUTURE_DATE, "time": "14:15" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_block_reopens_slot() {
    let ctx = TestContext::new();
    let path = format!("/api/coaches/{}/blocks", ctx.coach_id);

    let block: SlotBlockResponse = ctx
        .server
        .post(&path)
        .json(&json!({ "date": FUTURE_DATE, "time": "14:00" }))
        .await
        .json();

    ctx.server
        .delete(&format!("{}/{}", path, block.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    ctx.book(FUTURE_DATE, "14:00").await;

    ctx.server
        .delete(&format!("{}/{}", path, block.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_block_of_other_coach_is_not_found() {
    let ctx = TestContext::new();

    let block: SlotBlockResponse = ctx
        .server
        .post(&format!("/api/coaches/{}/blocks", ctx.coach_id))
        .json(&json!({ "date": FUTURE_DATE, "time": "14:00" }))
        .await
        .json();

    ctx.server
        .delete(&format!("/api/coaches/{}/blocks/{}", Uuid::new_v4(), block.id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
