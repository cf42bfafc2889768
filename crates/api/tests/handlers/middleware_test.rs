use axum::{http::StatusCode, response::IntoResponse};
use rstest::rstest;

use boxing24_api::middleware::error_handling::AppError;
use boxing24_core::errors::BookingError;

#[rstest]
#[case::not_found(BookingError::NotFound("Booking missing".into()), StatusCode::NOT_FOUND)]
#[case::validation(BookingError::Validation("Invalid date".into()), StatusCode::BAD_REQUEST)]
#[case::conflict(BookingError::Conflict("Slot taken".into()), StatusCode::CONFLICT)]
#[case::configuration(
    BookingError::Configuration("Bad work window".into()),
    StatusCode::INTERNAL_SERVER_ERROR
)]
#[case::database(
    BookingError::Database(eyre::eyre!("connection reset")),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status_mapping(#[case] error: BookingError, #[case] expected: StatusCode) {
    let response = AppError(error).into_response();
    assert_eq!(response.status(), expected);
}

#[test]
fn test_store_report_becomes_server_error() {
    let error: AppError = eyre::eyre!("pool timed out").into();

    assert!(matches!(error.0, BookingError::Database(_)));
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_error_body_carries_message() {
    let ctx = crate::test_utils::TestContext::new();

    let response = ctx
        .server
        .get(&format!("/api/coaches/{}/slots", ctx.coach_id))
        .add_query_param("date", "tomorrow")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&serde_json::json!({ "error": "Validation error: Invalid date: 'tomorrow'" }));
}
