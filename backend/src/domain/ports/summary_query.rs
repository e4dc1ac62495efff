//! Port abstraction for the read-only aggregation views.

use async_trait::async_trait;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::report::{ReportStatus, Severity};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by aggregation view adapters.
    pub enum SummaryQueryError {
        /// View connection could not be established.
        Connection { message: String } => "summary view connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "summary view query failed: {message}",
    }
}

/// Per-user reporting summary (non-staff users only).
///
/// Users with zero reports still appear, with zero counts and no
/// `last_report_at` (left-join semantics in the view).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserReportSummary {
    pub user_id: Uuid,
    pub username: String,
    pub total_reports: i64,
    pub completed_reports: i64,
    /// Sum of base awards recorded across the user's reports.
    pub total_base_credits: i64,
    #[schema(format = "date-time")]
    pub last_report_at: Option<DateTime<Utc>>,
}

/// One analytics bucket: (status, severity, calendar day of creation).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportAnalyticsBucket {
    pub status: ReportStatus,
    pub severity: Severity,
    pub day: NaiveDate,
    pub report_count: i64,
    pub avg_base_credits: f64,
}

#[async_trait]
pub trait SummaryQuery: Send + Sync {
    /// Per-user summaries, recomputed on demand.
    async fn user_summaries(&self) -> Result<Vec<UserReportSummary>, SummaryQueryError>;

    /// Status/severity/day analytics, ordered by day descending.
    async fn report_analytics(&self) -> Result<Vec<ReportAnalyticsBucket>, SummaryQueryError>;
}
