//! Aggregation API handlers over the reporting views.
//!
//! ```text
//! GET /api/v1/summaries/users       per-user reporting summary (staff)
//! GET /api/v1/summaries/analytics   status/severity/day buckets (staff)
//! ```

use actix_web::{get, web};

use crate::domain::ports::{ReportAnalyticsBucket, SummaryQueryError, UserReportSummary};
use crate::domain::Error;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

fn map_summary_error(error: SummaryQueryError) -> Error {
    match error {
        SummaryQueryError::Connection { message } => {
            Error::service_unavailable(format!("summary views unavailable: {message}"))
        }
        SummaryQueryError::Query { message } => {
            Error::internal(format!("summary view error: {message}"))
        }
    }
}

/// Per-user reporting summary, recomputed on demand from the view.
///
/// Staff accounts are excluded from the result; users with no reports appear
/// with zero counts.
#[utoipa::path(
    get,
    path = "/api/v1/summaries/users",
    responses(
        (status = 200, description = "Summaries", body = [UserReportSummary]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Staff access required", body = Error),
        (status = 503, description = "Views unavailable", body = Error)
    ),
    tags = ["summaries"],
    operation_id = "userSummaries"
)]
#[get("/summaries/users")]
pub async fn user_summaries(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserReportSummary>>> {
    session.require_staff()?;
    let summaries = state
        .summaries
        .user_summaries()
        .await
        .map_err(map_summary_error)?;
    Ok(web::Json(summaries))
}

/// Report analytics bucketed by status, severity, and creation day.
#[utoipa::path(
    get,
    path = "/api/v1/summaries/analytics",
    responses(
        (status = 200, description = "Buckets", body = [ReportAnalyticsBucket]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Staff access required", body = Error),
        (status = 503, description = "Views unavailable", body = Error)
    ),
    tags = ["summaries"],
    operation_id = "reportAnalytics"
)]
#[get("/summaries/analytics")]
pub async fn report_analytics(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ReportAnalyticsBucket>>> {
    session.require_staff()?;
    let buckets = state
        .summaries
        .report_analytics()
        .await
        .map_err(map_summary_error)?;
    Ok(web::Json(buckets))
}
