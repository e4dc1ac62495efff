//! Diesel-backed `SummaryQuery` adapter reading the aggregation views.
//!
//! Both views are created by migrations and recomputed by PostgreSQL on each
//! read; nothing is cached or materialised here.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    ReportAnalyticsBucket, SummaryQuery, SummaryQueryError, UserReportSummary,
};
use crate::domain::report::{ReportStatus, Severity};

use super::error_mapping::{map_basic_diesel_error, map_pool_error};
use super::models::{AnalyticsRow, UserSummaryRow};
use super::pool::{DbPool, PoolError};
use super::schema::{report_analytics, user_report_summary};

/// Diesel-backed implementation of the aggregation view port.
#[derive(Clone)]
pub struct DieselSummaryQuery {
    pool: DbPool,
}

impl DieselSummaryQuery {
    /// Create a new query adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_checkout_error(error: PoolError) -> SummaryQueryError {
    map_pool_error(error, SummaryQueryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SummaryQueryError {
    map_basic_diesel_error(error, SummaryQueryError::query, SummaryQueryError::connection)
}

fn row_to_bucket(row: AnalyticsRow) -> Result<ReportAnalyticsBucket, SummaryQueryError> {
    Ok(ReportAnalyticsBucket {
        status: ReportStatus::from_str(&row.status)
            .map_err(|err| SummaryQueryError::query(err.to_string()))?,
        severity: Severity::from_str(&row.severity)
            .map_err(|err| SummaryQueryError::query(err.to_string()))?,
        day: row.day,
        report_count: row.report_count,
        avg_base_credits: row.avg_base_credits,
    })
}

#[async_trait]
impl SummaryQuery for DieselSummaryQuery {
    async fn user_summaries(&self) -> Result<Vec<UserReportSummary>, SummaryQueryError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let rows = user_report_summary::table
            .order(user_report_summary::username.asc())
            .select(UserSummaryRow::as_select())
            .load::<UserSummaryRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|row| UserReportSummary {
                user_id: row.user_id,
                username: row.username,
                total_reports: row.total_reports,
                completed_reports: row.completed_reports,
                total_base_credits: row.total_base_credits,
                last_report_at: row.last_report_at,
            })
            .collect())
    }

    async fn report_analytics(&self) -> Result<Vec<ReportAnalyticsBucket>, SummaryQueryError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let rows = report_analytics::table
            .order(report_analytics::day.desc())
            .select(AnalyticsRow::as_select())
            .load::<AnalyticsRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_bucket).collect()
    }
}
