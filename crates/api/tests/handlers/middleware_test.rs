use axum::http::StatusCode;
use axum::response::IntoResponse;
use pretty_assertions::assert_eq;
use rstest::rstest;

use cuetime_api::middleware::error_handling::AppError;
use cuetime_core::errors::BookingError;

#[rstest]
#[case(BookingError::Validation("missing field".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::NotFound("no such table".into()), StatusCode::NOT_FOUND)]
#[case(BookingError::Conflict("slot taken".into()), StatusCode::CONFLICT)]
#[case(BookingError::Authentication("bad token".into()), StatusCode::UNAUTHORIZED)]
#[case(BookingError::Authorization("admin only".into()), StatusCode::FORBIDDEN)]
fn test_error_status_mapping(#[case] error: BookingError, #[case] expected: StatusCode) {
    let response = AppError(error).into_response();
    assert_eq!(response.status(), expected);
}

#[test]
fn test_database_error_is_internal() {
    let response = AppError(BookingError::Database(eyre::eyre!("pool exhausted"))).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_eyre_conversion_maps_to_database_error() {
    let err: AppError = eyre::eyre!("connection refused").into();
    assert!(matches!(err.0, BookingError::Database(_)));
}
