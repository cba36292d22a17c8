//! Shared validation helpers for inbound HTTP adapters.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::schedule::TransferFormat;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidDate,
    InvalidTimestamp,
    InvalidChoice,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidChoice => "invalid_choice",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn validation_error(
    field: FieldName,
    message: impl Into<String>,
    code: ErrorCode,
    value: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: String, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(&value).map_err(|_| {
        let message = format!("{} must be a valid UUID", field.as_str());
        validation_error(field, message, ErrorCode::InvalidUuid, value)
    })
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<Uuid>, Error> {
    value.map(|raw| parse_uuid(raw, field)).transpose()
}

pub(crate) fn parse_date(value: String, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
        let message = format!("{} must be a YYYY-MM-DD date", field.as_str());
        validation_error(field, message, ErrorCode::InvalidDate, value)
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            let message = format!("{} must be an RFC 3339 timestamp", field.as_str());
            validation_error(field, message, ErrorCode::InvalidTimestamp, value)
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

pub(crate) fn parse_transfer_format(value: String, field: FieldName) -> Result<TransferFormat, Error> {
    TransferFormat::parse(&value).ok_or_else(|| {
        let message = format!("{} must be csv, json, or ics", field.as_str());
        validation_error(field, message, ErrorCode::InvalidChoice, value)
    })
}

/// Parse a wire enum name with a domain-supplied parser.
pub(crate) fn parse_choice<T>(
    value: String,
    field: FieldName,
    allowed: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, Error> {
    parse(&value).ok_or_else(|| {
        let message = format!("{} must be one of: {allowed}", field.as_str());
        validation_error(field, message, ErrorCode::InvalidChoice, value)
    })
}
