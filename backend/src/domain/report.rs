//! Pothole report data model.
//!
//! Reports are created by citizens with status [`ReportStatus::Pending`] and a
//! fixed base award of [`crate::domain::credits::BASE_AWARD`] credits recorded
//! on the row. Only staff verification and progress actions move the status;
//! status transitions are the sole event driving credit automation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

/// Validation errors raised by report value-type constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValidationError {
    InvalidId,
    LatitudeOutOfRange { value: f64 },
    LongitudeOutOfRange { value: f64 },
    NonFiniteCoordinate,
    UnknownSeverity { value: String },
    UnknownStatus { value: String },
    LocationNameTooLong { max: usize },
}

impl fmt::Display for ReportValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "report id must be a valid UUID"),
            Self::LatitudeOutOfRange { value } => {
                write!(f, "latitude {value} is outside -90..=90")
            }
            Self::LongitudeOutOfRange { value } => {
                write!(f, "longitude {value} is outside -180..=180")
            }
            Self::NonFiniteCoordinate => write!(f, "coordinates must be finite numbers"),
            Self::UnknownSeverity { value } => write!(f, "unknown severity: {value}"),
            Self::UnknownStatus { value } => write!(f, "unknown report status: {value}"),
            Self::LocationNameTooLong { max } => {
                write!(f, "location name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for ReportValidationError {}

/// Externally-exposed stable report identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-validated UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a textual identifier.
    pub fn parse(raw: &str) -> Result<Self, ReportValidationError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| ReportValidationError::InvalidId)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Coarse ordinal classification of a reported pothole's urgency.
///
/// Immutable after report creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Canonical persisted spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ReportValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(ReportValidationError::UnknownSeverity {
                value: other.to_owned(),
            }),
        }
    }
}

/// The report's position in its handling lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    Verified,
    Rejected,
    InProgress,
    Completed,
}

impl ReportStatus {
    /// Canonical persisted spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Rejected => "REJECTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Statuses visible on the public map feed.
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Verified | Self::InProgress | Self::Completed)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = ReportValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "VERIFIED" => Ok(Self::Verified),
            "REJECTED" => Ok(Self::Rejected),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(ReportValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Maximum stored coordinate precision in fractional digits.
const COORDINATE_PRECISION: f64 = 1e8;
/// Maximum location name length, matching the persisted column width.
pub const LOCATION_NAME_MAX: usize = 200;

/// Validated geographic position.
///
/// Coordinates are rounded to eight fractional digits, the precision the
/// storage columns carry. Radius queries over these are approximate
/// bounding-box filters, not great-circle distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and construct a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ReportValidationError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(ReportValidationError::NonFiniteCoordinate);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ReportValidationError::LatitudeOutOfRange { value: latitude });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ReportValidationError::LongitudeOutOfRange { value: longitude });
        }
        Ok(Self {
            latitude: round_to_precision(latitude),
            longitude: round_to_precision(longitude),
        })
    }

    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn round_to_precision(value: f64) -> f64 {
    (value * COORDINATE_PRECISION).round() / COORDINATE_PRECISION
}

/// Reference to an uploaded image held in object storage.
///
/// The domain only ever stores the reference returned by the storage port;
/// image bytes never pass through the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredImage {
    /// Retrievable URL for clients.
    pub url: String,
    /// Storage key within the bucket or media root.
    pub key: String,
}

/// A citizen-submitted pothole observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: ReportId,
    pub owner: UserId,
    pub image: Option<StoredImage>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub severity: Severity,
    pub status: ReportStatus,
    /// Base award recorded at creation; bookkeeping only, distinct from the
    /// transition-driven bonus transfers.
    pub credits_awarded: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new report.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub owner: UserId,
    pub image: Option<StoredImage>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub severity: Severity,
}

impl NewReport {
    /// Validate the optional location name against the column width.
    pub fn validate(&self) -> Result<(), ReportValidationError> {
        if let Some(name) = &self.location_name {
            if name.chars().count() > LOCATION_NAME_MAX {
                return Err(ReportValidationError::LocationNameTooLong {
                    max: LOCATION_NAME_MAX,
                });
            }
        }
        Ok(())
    }
}
