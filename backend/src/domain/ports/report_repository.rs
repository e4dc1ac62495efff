//! Port abstraction for report persistence adapters and their errors.
//!
//! Status mutations carry the credit automation with them: adapters must
//! apply the status change and the owner's bonus inside one transaction, so
//! callers never observe a status change without its award or vice versa.

use async_trait::async_trait;

use crate::domain::report::{Coordinates, NewReport, Report, ReportId, ReportStatus, Severity};
use crate::domain::user::UserId;
use crate::domain::verification::{NewVerification, VerificationRecord};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by report repository adapters.
    pub enum ReportPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "report repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "report repository query failed: {message}",
        /// The referenced report does not exist.
        NotFound { id: String } => "report not found: {id}",
        /// The owning user reference does not resolve.
        OwnerNotFound { id: String } => "report owner not found: {id}",
    }
}

/// Result of a status mutation, including what the credit engine awarded.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub report: Report,
    pub previous_status: ReportStatus,
    /// Bonus credited to the owner in the same transaction (0 when the
    /// transition does not qualify).
    pub awarded: i32,
}

/// Result of the combined verification append + status transition.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedReport {
    pub record: VerificationRecord,
    pub update: StatusUpdate,
}

/// Approximate radius filter for `list_near`.
///
/// Expressed in coordinate degrees; adapters implement it as a bounding-box
/// comparison on the `(lat, lng)` columns, not a great-circle distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRadius {
    pub center: Coordinates,
    pub degrees: f64,
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a new report with status `PENDING` and the base award recorded.
    ///
    /// Fails with `OwnerNotFound` when the owning user reference does not
    /// resolve (foreign key violation).
    async fn create(&self, new_report: &NewReport) -> Result<Report, ReportPersistenceError>;

    /// Fetch a report by external identifier.
    async fn find_by_id(&self, id: &ReportId) -> Result<Option<Report>, ReportPersistenceError>;

    /// Apply a status mutation and the resulting credit bonus atomically.
    ///
    /// Refreshes `updated_at` on every call. The transition event is
    /// dispatched to the credit award policy inside the same transaction;
    /// no-op updates (old == new) award nothing.
    async fn update_status(
        &self,
        id: &ReportId,
        new_status: ReportStatus,
    ) -> Result<StatusUpdate, ReportPersistenceError>;

    /// Append a verification record and apply the implied status transition
    /// as one atomic unit.
    async fn record_verification(
        &self,
        id: &ReportId,
        verification: &NewVerification,
        new_status: ReportStatus,
    ) -> Result<VerifiedReport, ReportPersistenceError>;

    /// Reports owned by a user, newest first.
    async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Report>, ReportPersistenceError>;

    /// Reports in a given lifecycle status, newest first.
    async fn list_by_status(
        &self,
        status: ReportStatus,
    ) -> Result<Vec<Report>, ReportPersistenceError>;

    /// Reports of a given severity, newest first.
    async fn list_by_severity(
        &self,
        severity: Severity,
    ) -> Result<Vec<Report>, ReportPersistenceError>;

    /// Reports within an approximate bounding box around a centre point.
    async fn list_near(
        &self,
        radius: BoundingRadius,
    ) -> Result<Vec<Report>, ReportPersistenceError>;

    /// Publicly visible reports (`VERIFIED`, `IN_PROGRESS`, `COMPLETED`).
    async fn list_public(&self) -> Result<Vec<Report>, ReportPersistenceError>;

    /// All reports regardless of status, newest first (staff dashboard).
    async fn list_all(&self) -> Result<Vec<Report>, ReportPersistenceError>;
}
