//! Shared validation helpers for inbound HTTP adapters.
//!
//! Query parameters arrive as raw strings so that parse failures surface as
//! structured `invalid_request` errors naming the offending field, rather
//! than as opaque extractor rejections.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::json;

use crate::domain::{Error, start_of_day};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidInteger,
    InvalidNumber,
    InvalidDate,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidInteger => "invalid_integer",
            ErrorCode::InvalidNumber => "invalid_number",
            ErrorCode::InvalidDate => "invalid_date",
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
        Error::invalid_request(self.message).with_context(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_context(json!({
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

pub(crate) fn require(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_optional_integer(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<i64>, Error> {
    value
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| {
                let name = field.as_str();
                ValidationError::new(name, format!("{name} must be an integer"))
                    .with_value(ErrorCode::InvalidInteger, raw)
            })
        })
        .transpose()
}

pub(crate) fn parse_optional_number(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<f64>, Error> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .ok_or_else(|| {
                    let name = field.as_str();
                    ValidationError::new(name, format!("{name} must be a finite number"))
                        .with_value(ErrorCode::InvalidNumber, raw)
                })
        })
        .transpose()
}

/// Parse `YYYY-MM-DD` (midnight UTC), an RFC 3339 timestamp, or a naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp interpreted as UTC.
pub(crate) fn parse_date_or_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    let raw = value.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(start_of_day)
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|at| at.with_timezone(&Utc)))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|at| at.and_utc()))
        .map_err(|_| {
            let name = field.as_str();
            ValidationError::new(
                name,
                format!("{name} must be a date (YYYY-MM-DD) or an RFC 3339 timestamp"),
            )
            .with_value(ErrorCode::InvalidDate, value.clone())
        })
}

pub(crate) fn parse_optional_date_or_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_date_or_timestamp(raw, field))
        .transpose()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    const FIELD: FieldName = FieldName::new("weight_min");

    fn context_code(error: &Error) -> Option<&str> {
        error.context().and_then(|ctx| ctx["code"].as_str())
    }

    #[rstest]
    #[case(None, Ok(None))]
    #[case(Some("42"), Ok(Some(42)))]
    #[case(Some(" -7 "), Ok(Some(-7)))]
    #[case(Some("4.5"), Err("invalid_integer"))]
    #[case(Some("abc"), Err("invalid_integer"))]
    fn integers(#[case] raw: Option<&str>, #[case] expected: Result<Option<i64>, &str>) {
        let parsed = parse_optional_integer(raw.map(str::to_owned), FIELD);
        match expected {
            Ok(value) => assert_eq!(parsed.expect("parses"), value),
            Err(code) => assert_eq!(context_code(&parsed.expect_err("rejects")), Some(code)),
        }
    }

    #[rstest]
    #[case(Some("60"), Some(60.0))]
    #[case(Some("12.75"), Some(12.75))]
    #[case(None, None)]
    fn finite_numbers_parse(#[case] raw: Option<&str>, #[case] expected: Option<f64>) {
        let parsed = parse_optional_number(raw.map(str::to_owned), FIELD).expect("parses");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("NaN")]
    #[case("inf")]
    #[case("sixty")]
    fn non_finite_numbers_are_rejected(#[case] raw: &str) {
        let err = parse_optional_number(Some(raw.to_owned()), FIELD).expect_err("rejects");
        let context = err.context().expect("context");
        assert_eq!(context["field"], "weight_min");
        assert_eq!(context["value"], raw);
    }

    #[rstest]
    #[case("2024-05-20", Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0))]
    #[case("2024-05-20T09:30:00Z", Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0))]
    #[case("2024-05-20T11:30:00+02:00", Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0))]
    #[case("2024-05-20T09:30:00", Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0))]
    fn dates_and_timestamps_parse(
        #[case] raw: &str,
        #[case] expected: chrono::LocalResult<DateTime<Utc>>,
    ) {
        let parsed = parse_date_or_timestamp(raw.to_owned(), FIELD).expect("parses");
        assert_eq!(Some(parsed), expected.single());
    }

    #[rstest]
    #[case("20/05/2024")]
    #[case("2024-13-01")]
    #[case("")]
    fn malformed_dates_are_rejected(#[case] raw: &str) {
        let err = parse_date_or_timestamp(raw.to_owned(), FIELD).expect_err("rejects");
        assert_eq!(context_code(&err), Some("invalid_date"));
    }

    #[rstest]
    fn missing_required_field_names_the_field() {
        let err = require(None, FieldName::new("date_start")).expect_err("missing");
        assert_eq!(err.detail(), "missing required field: date_start");
        assert_eq!(context_code(&err), Some("missing_field"));
    }
}
