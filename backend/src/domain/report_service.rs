//! Report lifecycle services: submission, staff transitions, verification.
//!
//! Status mutations ride on the repository's transactional contract: the
//! credit bonus for a qualifying transition commits with the status change
//! or not at all.

use std::sync::Arc;

use tracing::info;

use super::error::Error;
use super::ports::{
    BoundingRadius, ReportPersistenceError, ReportRepository, StatusUpdate,
    VerificationPersistenceError, VerificationRepository, VerifiedReport,
};
use super::report::{NewReport, Report, ReportId, ReportStatus, Severity};
use super::user::UserId;
use super::verification::{NewVerification, VerificationRecord};

fn map_report_error(error: ReportPersistenceError) -> Error {
    match error {
        ReportPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("report repository unavailable: {message}"))
        }
        ReportPersistenceError::Query { message } => {
            Error::internal(format!("report repository error: {message}"))
        }
        ReportPersistenceError::NotFound { id } => {
            Error::not_found(format!("report {id} not found"))
        }
        ReportPersistenceError::OwnerNotFound { id } => {
            Error::conflict(format!("report owner {id} does not exist"))
        }
    }
}

fn map_verification_error(error: VerificationPersistenceError) -> Error {
    match error {
        VerificationPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("verification log unavailable: {message}"))
        }
        VerificationPersistenceError::Query { message } => {
            Error::internal(format!("verification log error: {message}"))
        }
    }
}

/// Application service over the report store and verification log.
#[derive(Clone)]
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    verifications: Arc<dyn VerificationRepository>,
}

impl ReportService {
    /// Create a new service over the report and verification ports.
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        verifications: Arc<dyn VerificationRepository>,
    ) -> Self {
        Self {
            reports,
            verifications,
        }
    }

    /// Submit a citizen report. Created `PENDING` with the base award
    /// recorded on the row.
    pub async fn submit(&self, new_report: NewReport) -> Result<Report, Error> {
        new_report
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let report = self
            .reports
            .create(&new_report)
            .await
            .map_err(map_report_error)?;
        info!(report_id = %report.id, owner = %report.owner, severity = %report.severity, "report submitted");
        Ok(report)
    }

    /// Fetch a report by identifier.
    pub async fn get(&self, id: &ReportId) -> Result<Report, Error> {
        self.reports
            .find_by_id(id)
            .await
            .map_err(map_report_error)?
            .ok_or_else(|| Error::not_found(format!("report {id} not found")))
    }

    /// Staff progress update: move a report to a new lifecycle status.
    ///
    /// The repository applies the transition and any credit bonus in one
    /// transaction; the returned update says what was awarded.
    pub async fn update_status(
        &self,
        id: &ReportId,
        new_status: ReportStatus,
    ) -> Result<StatusUpdate, Error> {
        let update = self
            .reports
            .update_status(id, new_status)
            .await
            .map_err(map_report_error)?;
        info!(
            report_id = %id,
            from = %update.previous_status,
            to = %update.report.status,
            awarded = update.awarded,
            "report status updated"
        );
        Ok(update)
    }

    /// Record a staff verification decision.
    ///
    /// Appends the verification record and applies the outcome's implied
    /// status transition as a single atomic unit.
    pub async fn verify(
        &self,
        id: &ReportId,
        verification: NewVerification,
    ) -> Result<VerifiedReport, Error> {
        let new_status = verification.outcome.implied_status();
        let verified = self
            .reports
            .record_verification(id, &verification, new_status)
            .await
            .map_err(map_report_error)?;
        info!(
            report_id = %id,
            outcome = %verification.outcome,
            to = %verified.update.report.status,
            awarded = verified.update.awarded,
            "report verified"
        );
        Ok(verified)
    }

    /// Verification history for a report, newest first.
    pub async fn verification_history(
        &self,
        id: &ReportId,
    ) -> Result<Vec<VerificationRecord>, Error> {
        self.verifications
            .list_for_report(id)
            .await
            .map_err(map_verification_error)
    }

    /// Reports owned by a user, newest first.
    pub async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Report>, Error> {
        self.reports
            .list_for_user(owner)
            .await
            .map_err(map_report_error)
    }

    /// Reports in a given status, newest first.
    pub async fn list_by_status(&self, status: ReportStatus) -> Result<Vec<Report>, Error> {
        self.reports
            .list_by_status(status)
            .await
            .map_err(map_report_error)
    }

    /// Reports of a given severity, newest first.
    pub async fn list_by_severity(&self, severity: Severity) -> Result<Vec<Report>, Error> {
        self.reports
            .list_by_severity(severity)
            .await
            .map_err(map_report_error)
    }

    /// Reports within an approximate bounding box.
    pub async fn list_near(&self, radius: BoundingRadius) -> Result<Vec<Report>, Error> {
        self.reports
            .list_near(radius)
            .await
            .map_err(map_report_error)
    }

    /// Publicly visible reports for the map feed.
    pub async fn list_public(&self) -> Result<Vec<Report>, Error> {
        self.reports.list_public().await.map_err(map_report_error)
    }

    /// All reports (staff dashboard), newest first.
    pub async fn list_all(&self) -> Result<Vec<Report>, Error> {
        self.reports.list_all().await.map_err(map_report_error)
    }
}

#[cfg(test)]
#[path = "report_service_tests.rs"]
mod tests;
