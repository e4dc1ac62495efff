//! Shared validation helpers for inbound HTTP adapters.
//!
//! Handlers parse textual request fields into domain value types through
//! these helpers so every validation failure carries the same
//! `{field, value, code}` details shape.

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use crate::domain::report::{ReportStatus, Severity};
use crate::domain::verification::VerificationOutcome;
use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidEnum,
    InvalidDate,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidEnum => "invalid_enum",
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

fn invalid_value_error(
    field: FieldName,
    message: String,
    code: ErrorCode,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        let name = field.as_str();
        invalid_value_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn parse_severity(value: &str, field: FieldName) -> Result<Severity, Error> {
    value.parse::<Severity>().map_err(|_| {
        let name = field.as_str();
        invalid_value_error(
            field,
            format!("{name} must be one of LOW, MEDIUM, HIGH, CRITICAL"),
            ErrorCode::InvalidEnum,
            value,
        )
    })
}

pub(crate) fn parse_status(value: &str, field: FieldName) -> Result<ReportStatus, Error> {
    value.parse::<ReportStatus>().map_err(|_| {
        let name = field.as_str();
        invalid_value_error(
            field,
            format!(
                "{name} must be one of PENDING, VERIFIED, REJECTED, IN_PROGRESS, COMPLETED"
            ),
            ErrorCode::InvalidEnum,
            value,
        )
    })
}

pub(crate) fn parse_outcome(value: &str, field: FieldName) -> Result<VerificationOutcome, Error> {
    value.parse::<VerificationOutcome>().map_err(|_| {
        let name = field.as_str();
        invalid_value_error(
            field,
            format!("{name} must be one of APPROVED, REJECTED, NEED_INFO"),
            ErrorCode::InvalidEnum,
            value,
        )
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                let name = field.as_str();
                invalid_value_error(
                    field,
                    format!("{name} must be a YYYY-MM-DD date"),
                    ErrorCode::InvalidDate,
                    raw,
                )
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn details(error: &Error) -> &serde_json::Map<String, Value> {
        error
            .details()
            .and_then(Value::as_object)
            .expect("details present")
    }

    #[test]
    fn uuid_failures_carry_field_context() {
        let error = parse_uuid("nope", FieldName::new("reportId")).expect_err("must fail");
        let details = details(&error);
        assert_eq!(details["field"], "reportId");
        assert_eq!(details["code"], "invalid_uuid");
        assert_eq!(details["value"], "nope");
    }

    #[rstest]
    #[case("HIGH")]
    #[case("LOW")]
    fn known_severities_parse(#[case] raw: &str) {
        assert!(parse_severity(raw, FieldName::new("severity")).is_ok());
    }

    #[test]
    fn unknown_severity_is_a_validation_error() {
        let error = parse_severity("EXTREME", FieldName::new("severity")).expect_err("must fail");
        assert_eq!(details(&error)["code"], "invalid_enum");
    }

    #[test]
    fn dates_parse_iso_format_only() {
        let ok = parse_optional_date(Some("2026-03-14"), FieldName::new("estimatedRepairDate"))
            .expect("parses");
        assert_eq!(ok, Some(NaiveDate::from_ymd_opt(2026, 3, 14).expect("date")));

        let error = parse_optional_date(Some("14/03/2026"), FieldName::new("estimatedRepairDate"))
            .expect_err("must fail");
        assert_eq!(details(&error)["code"], "invalid_date");
    }

    #[test]
    fn absent_dates_are_fine() {
        let parsed =
            parse_optional_date(None, FieldName::new("estimatedRepairDate")).expect("parses");
        assert_eq!(parsed, None);
    }
}
