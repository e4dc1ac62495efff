//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::report::{Coordinates, Report, ReportId, ReportStatus, Severity, StoredImage};
use crate::domain::user::{
    EmailAddress, PasswordHash, PhoneNumber, User, UserId, Username,
};
use crate::domain::verification::{VerificationOutcome, VerificationRecord};

use super::schema::{
    pothole_reports, report_analytics, user_report_summary, users, verification_records,
};

/// Conversion failures from persisted rows to validated domain values.
///
/// A failure here means the database holds data the domain rejects; the
/// repositories surface it as a query error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid persisted row: {message}")]
pub(crate) struct RowConversionError {
    pub message: String,
}

impl RowConversionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// User models
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    #[expect(dead_code, reason = "surrogate key stays inside the adapter")]
    pub id: i32,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub credits: i32,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RowConversionError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let phone_number = row
            .phone_number
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|err| RowConversionError::new(err.to_string()))?;
        Ok(Self {
            id: UserId::from_uuid(row.user_id),
            username: Username::new(row.username)
                .map_err(|err| RowConversionError::new(err.to_string()))?,
            email: EmailAddress::new(row.email)
                .map_err(|err| RowConversionError::new(err.to_string()))?,
            phone_number,
            password_hash: PasswordHash::new(row.password_hash)
                .map_err(|err| RowConversionError::new(err.to_string()))?,
            credits: row.credits,
            is_staff: row.is_staff,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub user_id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub phone_number: Option<&'a str>,
    pub password_hash: &'a str,
    pub is_staff: bool,
}

// ---------------------------------------------------------------------------
// Report models
// ---------------------------------------------------------------------------

/// Row struct for reading from the pothole_reports table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pothole_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReportRow {
    #[expect(dead_code, reason = "surrogate key stays inside the adapter")]
    pub id: i32,
    pub report_id: Uuid,
    pub user_id: Uuid,
    pub image_url: Option<String>,
    pub storage_key: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub severity: String,
    pub status: String,
    pub credits_awarded: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = RowConversionError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let image = match (row.image_url, row.storage_key) {
            (Some(url), Some(key)) => Some(StoredImage { url, key }),
            (Some(url), None) => Some(StoredImage {
                key: String::new(),
                url,
            }),
            _ => None,
        };
        let coordinates = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => Some(
                Coordinates::new(lat, lng)
                    .map_err(|err| RowConversionError::new(err.to_string()))?,
            ),
            _ => None,
        };
        Ok(Self {
            id: ReportId::from_uuid(row.report_id),
            owner: UserId::from_uuid(row.user_id),
            image,
            description: row.description,
            location_name: row.location_name,
            coordinates,
            severity: Severity::from_str(&row.severity)
                .map_err(|err| RowConversionError::new(err.to_string()))?,
            status: ReportStatus::from_str(&row.status)
                .map_err(|err| RowConversionError::new(err.to_string()))?,
            credits_awarded: row.credits_awarded,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating new report records.
#[derive(Debug, Insertable)]
#[diesel(table_name = pothole_reports)]
pub(crate) struct NewReportRow<'a> {
    pub report_id: Uuid,
    pub user_id: Uuid,
    pub image_url: Option<&'a str>,
    pub storage_key: Option<&'a str>,
    pub description: Option<&'a str>,
    pub location_name: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub severity: &'a str,
    pub status: &'a str,
    pub credits_awarded: i32,
}

// ---------------------------------------------------------------------------
// Verification models
// ---------------------------------------------------------------------------

/// Row struct for reading from the verification_records table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = verification_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VerificationRow {
    #[expect(dead_code, reason = "surrogate key stays inside the adapter")]
    pub id: i32,
    pub report_id: Uuid,
    pub verified_by: String,
    pub outcome: Option<String>,
    pub notes: Option<String>,
    pub verified_at: DateTime<Utc>,
    pub estimated_repair_date: Option<NaiveDate>,
}

impl TryFrom<VerificationRow> for VerificationRecord {
    type Error = RowConversionError;

    fn try_from(row: VerificationRow) -> Result<Self, Self::Error> {
        let outcome = row
            .outcome
            .as_deref()
            .map(VerificationOutcome::from_str)
            .transpose()
            .map_err(|err| RowConversionError::new(err.to_string()))?;
        Ok(Self {
            report_id: ReportId::from_uuid(row.report_id),
            verified_by: row.verified_by,
            outcome,
            notes: row.notes,
            verified_at: row.verified_at,
            estimated_repair_date: row.estimated_repair_date,
        })
    }
}

/// Insertable struct for appending verification records.
#[derive(Debug, Insertable)]
#[diesel(table_name = verification_records)]
pub(crate) struct NewVerificationRow<'a> {
    pub report_id: Uuid,
    pub verified_by: &'a str,
    pub outcome: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub estimated_repair_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// Row struct for reading the user_report_summary view.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_report_summary)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserSummaryRow {
    pub user_id: Uuid,
    pub username: String,
    pub total_reports: i64,
    pub completed_reports: i64,
    pub total_base_credits: i64,
    pub last_report_at: Option<DateTime<Utc>>,
}

/// Row struct for reading the report_analytics view.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = report_analytics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnalyticsRow {
    pub status: String,
    pub severity: String,
    pub day: NaiveDate,
    pub report_count: i64,
    pub avg_base_credits: f64,
}
