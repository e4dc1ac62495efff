//! Port abstraction for reading the verification log.
//!
//! Appending happens through `ReportRepository::record_verification` so the
//! append and the implied status transition share one transaction; this port
//! only exposes the read side of the log.

use async_trait::async_trait;

use crate::domain::report::ReportId;
use crate::domain::verification::VerificationRecord;

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by verification log adapters.
    pub enum VerificationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "verification log connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "verification log query failed: {message}",
    }
}

#[async_trait]
pub trait VerificationRepository: Send + Sync {
    /// Verification history for a report, newest first.
    async fn list_for_report(
        &self,
        report_id: &ReportId,
    ) -> Result<Vec<VerificationRecord>, VerificationPersistenceError>;
}
