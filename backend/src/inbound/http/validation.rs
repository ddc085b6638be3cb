//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request-shape failures all map to `invalid_request` with a `details`
//! object naming the offending field, so clients can highlight the right
//! form control.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

pub(crate) fn field_error(field: &'static str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field }))
}

pub(crate) fn invalid_uuid_error(field: &'static str, value: &str) -> Error {
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
    }))
}

pub(crate) fn parse_uuid(value: &str, field: &'static str) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_optional_uuid(
    value: Option<&str>,
    field: &'static str,
) -> Result<Option<Uuid>, Error> {
    value.map(|raw| parse_uuid(raw, field)).transpose()
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: &'static str,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            Error::invalid_request(format!("{field} must be an RFC 3339 timestamp")).with_details(
                json!({
                    "field": field,
                    "value": value,
                }),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::Value;

    fn detail_field(error: &Error) -> Option<String> {
        error
            .details()
            .and_then(Value::as_object)
            .and_then(|details| details.get("field"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn parse_uuid_rejects_bad_input(#[case] raw: &str) {
        let err = parse_uuid(raw, "productId").expect_err("invalid UUID");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(detail_field(&err).as_deref(), Some("productId"));
    }

    #[rstest]
    fn parse_uuid_accepts_canonical_form() {
        let id = parse_uuid("3fa85f64-5717-4562-b3fc-2c963f66afa6", "id").expect("valid UUID");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    fn parse_timestamp_accepts_rfc3339() {
        let parsed =
            parse_rfc3339_timestamp("2026-08-27T10:00:00Z", "startsAt").expect("valid timestamp");
        assert_eq!(parsed.to_rfc3339(), "2026-08-27T10:00:00+00:00");
    }

    #[rstest]
    fn parse_timestamp_rejects_dates_without_time() {
        let err = parse_rfc3339_timestamp("2026-08-27", "startsAt").expect_err("invalid");
        assert_eq!(detail_field(&err).as_deref(), Some("startsAt"));
    }
}
