//! Verification API handlers.
//!
//! ```text
//! POST /api/v1/reports/{id}/verify          staff decision, transactional
//! GET  /api/v1/reports/{id}/verifications   decision history, newest first
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, NewVerification, VerificationRecord};
use crate::inbound::http::reports::ReportResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_optional_date, parse_outcome, FieldName};
use crate::inbound::http::ApiResult;

use serde_json::json;

/// Staff verification request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// One of `APPROVED`, `REJECTED`, `NEED_INFO`.
    pub outcome: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// `YYYY-MM-DD`, typically set when approving.
    #[serde(default)]
    pub estimated_repair_date: Option<String>,
}

/// One recorded verification decision.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecordResponse {
    #[schema(value_type = String)]
    pub report_id: Uuid,
    pub verified_by: String,
    pub outcome: Option<String>,
    pub notes: Option<String>,
    #[schema(format = "date-time")]
    pub verified_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date")]
    pub estimated_repair_date: Option<NaiveDate>,
}

impl From<VerificationRecord> for VerificationRecordResponse {
    fn from(record: VerificationRecord) -> Self {
        Self {
            report_id: *record.report_id.as_uuid(),
            verified_by: record.verified_by,
            outcome: record.outcome.map(|o| o.to_string()),
            notes: record.notes,
            verified_at: record.verified_at,
            estimated_repair_date: record.estimated_repair_date,
        }
    }
}

/// Result of a verification: the appended record plus the status transition
/// it implied, committed together.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub record: VerificationRecordResponse,
    pub report: ReportResponse,
    pub previous_status: String,
    /// Bonus credited to the owner in the same transaction.
    pub awarded: i32,
}

fn parse_report_id(raw: &str) -> Result<crate::domain::ReportId, Error> {
    crate::domain::ReportId::parse(raw).map_err(|e| {
        Error::invalid_request(e.to_string()).with_details(json!({ "field": "id", "value": raw }))
    })
}

/// Record a staff verification decision.
///
/// The record is appended and the outcome's implied status transition is
/// applied in the same transaction, along with any credit bonus:
/// `APPROVED` moves the report to `VERIFIED`, `REJECTED` to `REJECTED`, and
/// `NEED_INFO` back to `PENDING`.
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/verify",
    params(("id" = String, Path, description = "Report identifier")),
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Decision recorded", body = VerifyResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Staff access required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["verifications"],
    operation_id = "verifyReport"
)]
#[post("/reports/{id}/verify")]
pub async fn verify_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VerifyRequest>,
) -> ApiResult<web::Json<VerifyResponse>> {
    let staff_id = session.require_staff()?;
    let id = parse_report_id(&path.into_inner())?;
    let payload = payload.into_inner();
    let outcome = parse_outcome(&payload.outcome, FieldName::new("outcome"))?;
    let estimated_repair_date = parse_optional_date(
        payload.estimated_repair_date.as_deref(),
        FieldName::new("estimatedRepairDate"),
    )?;

    // Attribute the decision to the staff account on record.
    let staff = state.users.profile(&staff_id).await?;

    let verified = state
        .reports
        .verify(
            &id,
            NewVerification {
                verified_by: staff.username.to_string(),
                outcome,
                notes: payload.notes,
                estimated_repair_date,
            },
        )
        .await?;
    Ok(web::Json(VerifyResponse {
        record: VerificationRecordResponse::from(verified.record),
        previous_status: verified.update.previous_status.to_string(),
        awarded: verified.update.awarded,
        report: ReportResponse::from(verified.update.report),
    }))
}

/// Verification history for a report, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}/verifications",
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "History", body = [VerificationRecordResponse]),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["verifications"],
    operation_id = "listVerifications"
)]
#[get("/reports/{id}/verifications")]
pub async fn list_verifications(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<VerificationRecordResponse>>> {
    session.require_user_id()?;
    let id = parse_report_id(&path.into_inner())?;
    // 404 for unknown reports rather than an empty history.
    state.reports.get(&id).await?;
    let records = state.reports.verification_history(&id).await?;
    Ok(web::Json(
        records
            .into_iter()
            .map(VerificationRecordResponse::from)
            .collect(),
    ))
}

#[cfg(test)]
#[path = "verifications_tests.rs"]
mod tests;
