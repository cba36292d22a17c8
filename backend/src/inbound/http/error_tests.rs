//! Tests for the HTTP error mapping.

use actix_web::ResponseError;
use actix_web::body::MessageBody;
use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{Error, ErrorCode};

fn body_json(error: &Error) -> Value {
    let response = error.error_response();
    let bytes = response
        .into_body()
        .try_into_bytes()
        .expect("error body is in memory");
    serde_json::from_slice(&bytes).expect("error body is JSON")
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("who"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("no"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("gone"), StatusCode::NOT_FOUND)]
#[case(Error::invalid_transition("frozen"), StatusCode::CONFLICT)]
#[case(Error::conflict_blocking("clash"), StatusCode::CONFLICT)]
#[case(Error::conversion_failed("half"), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_codes_follow_error_codes(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(error.status_code(), expected);
}

#[test]
fn internal_errors_are_redacted() {
    let error = Error::internal("database password rejected")
        .with_details(json!({"dsn": "postgres://secret"}));
    let body = body_json(&error);
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Internal server error")
    );
    assert!(body.get("details").is_none());
}

#[test]
fn client_errors_keep_message_and_details() {
    let error = Error::invalid_request("name must not be empty")
        .with_details(json!({"field": "name"}));
    let body = body_json(&error);
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("name must not be empty")
    );
    assert_eq!(body["details"]["field"], "name");
}

#[test]
fn error_code_serialises_to_snake_case() {
    let body = body_json(&Error::conflict_blocking("blocked"));
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("conflict_blocking")
    );
    let _ = ErrorCode::ConflictBlocking;
}
