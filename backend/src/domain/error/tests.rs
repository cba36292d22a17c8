//! Regression coverage for the domain error payload.

use rstest::rstest;
use serde_json::json;

use super::{Error, ErrorCode};

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("nope"), ErrorCode::Forbidden)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::invalid_transition("stuck"), ErrorCode::InvalidTransition)]
#[case(Error::conflict_blocking("blocked"), ErrorCode::ConflictBlocking)]
#[case(Error::conversion_failed("rolled back"), ErrorCode::ConversionFailed)]
#[case(Error::service_unavailable("pool down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_expected_code(#[case] err: Error, #[case] code: ErrorCode) {
    assert_eq!(err.code(), code);
}

#[test]
fn details_round_trip_through_serde() {
    let err = Error::invalid_transition("cannot resume while game is scheduled")
        .with_details(json!({ "current": "scheduled", "requested": "resume" }));

    let value = serde_json::to_value(&err).expect("serialises");
    assert_eq!(value["code"], "invalid_transition");
    assert_eq!(value["details"]["current"], "scheduled");

    let back: Error = serde_json::from_value(value).expect("deserialises");
    assert_eq!(back, err);
}

#[test]
fn details_are_omitted_when_absent() {
    let value = serde_json::to_value(Error::not_found("missing")).expect("serialises");
    assert!(value.get("details").is_none());
}

#[test]
fn display_includes_code_and_message() {
    let rendered = Error::conflict_blocking("2 unresolved conflicts").to_string();
    assert!(rendered.contains("ConflictBlocking"));
    assert!(rendered.contains("unresolved"));
}
