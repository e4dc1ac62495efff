//! Staff verification records.
//!
//! Append-style log: several records per report are allowed (re-verification
//! history). Records are never mutated; they disappear only when the owning
//! report is deleted via cascade.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::report::{ReportId, ReportStatus};

/// Validation errors raised by verification value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationValidationError {
    UnknownOutcome { value: String },
}

impl fmt::Display for VerificationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOutcome { value } => write!(f, "unknown verification outcome: {value}"),
        }
    }
}

impl std::error::Error for VerificationValidationError {}

/// Outcome of a staff verification decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationOutcome {
    Approved,
    Rejected,
    NeedInfo,
}

impl VerificationOutcome {
    /// Canonical persisted spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::NeedInfo => "NEED_INFO",
        }
    }

    /// Report status implied by this outcome.
    ///
    /// `NEED_INFO` returns the report to the pending queue.
    pub const fn implied_status(self) -> ReportStatus {
        match self {
            Self::Approved => ReportStatus::Verified,
            Self::Rejected => ReportStatus::Rejected,
            Self::NeedInfo => ReportStatus::Pending,
        }
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationOutcome {
    type Err = VerificationValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "NEED_INFO" => Ok(Self::NeedInfo),
            other => Err(VerificationValidationError::UnknownOutcome {
                value: other.to_owned(),
            }),
        }
    }
}

/// A recorded staff verification decision.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRecord {
    pub report_id: ReportId,
    pub verified_by: String,
    /// Nullable: a record may be opened before an outcome is decided.
    pub outcome: Option<VerificationOutcome>,
    pub notes: Option<String>,
    pub verified_at: DateTime<Utc>,
    pub estimated_repair_date: Option<NaiveDate>,
}

/// Payload appended when staff records a decision.
#[derive(Debug, Clone)]
pub struct NewVerification {
    pub verified_by: String,
    pub outcome: VerificationOutcome,
    pub notes: Option<String>,
    pub estimated_repair_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for outcome mapping.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(VerificationOutcome::Approved, ReportStatus::Verified)]
    #[case(VerificationOutcome::Rejected, ReportStatus::Rejected)]
    #[case(VerificationOutcome::NeedInfo, ReportStatus::Pending)]
    fn outcomes_imply_expected_statuses(
        #[case] outcome: VerificationOutcome,
        #[case] expected: ReportStatus,
    ) {
        assert_eq!(outcome.implied_status(), expected);
    }

    #[rstest]
    #[case("APPROVED", VerificationOutcome::Approved)]
    #[case("NEED_INFO", VerificationOutcome::NeedInfo)]
    fn spellings_parse(#[case] text: &str, #[case] expected: VerificationOutcome) {
        assert_eq!(text.parse::<VerificationOutcome>().expect("parse"), expected);
    }

    #[test]
    fn unknown_outcome_is_rejected() {
        let error = "MAYBE".parse::<VerificationOutcome>().expect_err("fails");
        assert_eq!(
            error,
            VerificationValidationError::UnknownOutcome {
                value: "MAYBE".to_owned()
            }
        );
    }
}
