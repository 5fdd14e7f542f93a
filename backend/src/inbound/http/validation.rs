//! Shared validation helpers for inbound HTTP adapters.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    DonationId, DonationStatus, Error, MatchFieldError, MatchId, MatchStatus, PageRequest, Rating,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidStatus,
    OutOfRange,
    TooLong,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidStatus => "invalid_status",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::TooLong => "too_long",
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

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_donation_id(value: &str, field: FieldName) -> Result<DonationId, Error> {
    parse_uuid(value, field).map(DonationId::from_uuid)
}

pub(crate) fn parse_match_id(value: &str, field: FieldName) -> Result<MatchId, Error> {
    parse_uuid(value, field).map(MatchId::from_uuid)
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be an RFC 3339 timestamp"))
        .with_value(ErrorCode::InvalidTimestamp, value)
}

pub(crate) fn parse_rfc3339_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| invalid_timestamp_error(field, &value))
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

fn invalid_status_error(field: FieldName, value: &str, expected: String) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be one of {expected}"))
        .with_value(ErrorCode::InvalidStatus, value)
}

pub(crate) fn parse_match_status(value: &str, field: FieldName) -> Result<MatchStatus, Error> {
    value.parse::<MatchStatus>().map_err(|_| {
        let expected = MatchStatus::ALL.map(MatchStatus::as_str).join(", ");
        invalid_status_error(field, value, expected)
    })
}

pub(crate) fn parse_donation_status(
    value: &str,
    field: FieldName,
) -> Result<DonationStatus, Error> {
    value.parse::<DonationStatus>().map_err(|_| {
        let expected = DonationStatus::ALL.map(DonationStatus::as_str).join(", ");
        invalid_status_error(field, value, expected)
    })
}

pub(crate) fn parse_optional_rating(
    value: Option<i64>,
    field: FieldName,
) -> Result<Option<Rating>, Error> {
    value
        .map(|raw| {
            Rating::new(raw).map_err(|_| {
                let name = field.as_str();
                ValidationError::new(
                    name,
                    format!(
                        "{name} must be between {} and {}",
                        Rating::MIN,
                        Rating::MAX
                    ),
                )
                .with_value(ErrorCode::OutOfRange, raw.to_string())
            })
        })
        .transpose()
}

pub(crate) fn parse_page_request(page: Option<u32>, size: Option<u32>) -> Result<PageRequest, Error> {
    let defaults = PageRequest::default();
    let size = size.unwrap_or(defaults.size());
    PageRequest::new(page.unwrap_or(defaults.page()), size).map_err(|err| {
        ValidationError::new("size", err.to_string())
            .with_value(ErrorCode::OutOfRange, size.to_string())
    })
}

pub(crate) fn text_field_error(error: MatchFieldError) -> Error {
    ValidationError::new(error.field(), error.to_string()).with_code(ErrorCode::TooLong)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.details().and_then(|details| details.get(key))
    }

    #[rstest]
    #[case("IN_PROGRESS", MatchStatus::InProgress)]
    #[case("CANCELLED", MatchStatus::Cancelled)]
    fn parses_known_match_statuses(#[case] raw: &str, #[case] expected: MatchStatus) {
        let status = parse_match_status(raw, FieldName::new("status")).expect("known status");
        assert_eq!(status, expected);
    }

    #[rstest]
    fn unknown_status_lists_the_accepted_values() {
        let err = parse_match_status("SHIPPED", FieldName::new("status")).expect_err("unknown");
        assert!(err.message().contains("PENDING"));
        assert_eq!(
            detail(&err, "code").and_then(Value::as_str),
            Some("invalid_status")
        );
        assert_eq!(detail(&err, "value").and_then(Value::as_str), Some("SHIPPED"));
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    fn ratings_outside_the_scale_are_rejected(#[case] raw: i64) {
        let err = parse_optional_rating(Some(raw), FieldName::new("rating"))
            .expect_err("out of range");
        assert_eq!(
            detail(&err, "code").and_then(Value::as_str),
            Some("out_of_range")
        );
    }

    #[rstest]
    fn missing_rating_is_none() {
        let rating = parse_optional_rating(None, FieldName::new("rating")).expect("absent");
        assert!(rating.is_none());
    }

    #[rstest]
    fn malformed_uuid_echoes_value() {
        let err = parse_donation_id("abc", FieldName::new("donationId")).expect_err("bad uuid");
        assert_eq!(detail(&err, "field").and_then(Value::as_str), Some("donationId"));
        assert_eq!(detail(&err, "value").and_then(Value::as_str), Some("abc"));
    }

    #[rstest]
    fn timestamps_are_normalised_to_utc() {
        let parsed = parse_rfc3339_timestamp(
            "2026-03-01T10:00:00+02:00".to_owned(),
            FieldName::new("pickupDate"),
        )
        .expect("valid timestamp");
        assert_eq!(parsed.to_rfc3339(), "2026-03-01T08:00:00+00:00");
    }

    #[rstest]
    #[case(None, None, 0, 10)]
    #[case(Some(2), Some(5), 2, 5)]
    fn page_defaults_apply(
        #[case] page: Option<u32>,
        #[case] size: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_size: u32,
    ) {
        let request = parse_page_request(page, size).expect("valid page");
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.size(), expected_size);
    }

    #[rstest]
    fn oversized_page_is_rejected() {
        let err = parse_page_request(None, Some(500)).expect_err("too large");
        assert_eq!(detail(&err, "field").and_then(Value::as_str), Some("size"));
    }
}
