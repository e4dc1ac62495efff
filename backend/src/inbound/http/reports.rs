//! Report API handlers.
//!
//! ```text
//! POST /api/v1/reports                 submit a pothole report
//! GET  /api/v1/reports                 staff: all reports, optional filters
//! GET  /api/v1/reports/mine            the caller's reports
//! GET  /api/v1/reports/public          public map feed
//! GET  /api/v1/reports/pending         staff verification queue
//! GET  /api/v1/reports/near            bounding-box proximity search
//! GET  /api/v1/reports/{id}            single report
//! POST /api/v1/reports/{id}/status     staff progress update
//! POST /api/v1/uploads/images          store an image, returns the reference
//! ```

use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::BoundingRadius;
use crate::domain::{Coordinates, Error, NewReport, Report, ReportId, StoredImage};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_severity, parse_status, FieldName};
use crate::inbound::http::ApiResult;

/// Report creation request body.
///
/// The image, if any, is uploaded first via `POST /api/v1/uploads/images`;
/// this body carries only the returned reference.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    /// One of `LOW`, `MEDIUM`, `HIGH`, `CRITICAL`.
    pub severity: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub image: Option<StoredImage>,
}

/// Staff progress update request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    /// One of `PENDING`, `VERIFIED`, `REJECTED`, `IN_PROGRESS`, `COMPLETED`.
    pub status: String,
}

/// Serialised report returned by every report endpoint.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[schema(value_type = String, example = "7c9e6679-7425-40de-944b-e07fc1f90ae7")]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub owner: Uuid,
    pub image: Option<StoredImage>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub severity: String,
    pub status: String,
    /// Base award recorded at submission (bookkeeping, not the balance).
    pub credits_awarded: i32,
    #[schema(format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            id: *report.id.as_uuid(),
            owner: *report.owner.as_uuid(),
            image: report.image,
            description: report.description,
            location_name: report.location_name,
            latitude: report.coordinates.map(|c| c.latitude()),
            longitude: report.coordinates.map(|c| c.longitude()),
            severity: report.severity.to_string(),
            status: report.status.to_string(),
            credits_awarded: report.credits_awarded,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

/// Result of a staff progress update, including the credit bonus applied.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub report: ReportResponse,
    pub previous_status: String,
    /// Bonus credited to the owner in the same transaction.
    pub awarded: i32,
}

/// Optional staff listing filters; at most one may be set.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

/// Proximity query parameters. `radius` is in coordinate degrees and the
/// search is a bounding box, not a great-circle distance.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NearQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
}

/// Upload query parameters.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct UploadQuery {
    /// Client filename, sanitised by the storage adapter.
    pub filename: String,
}

fn parse_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinates>, Error> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng).map(Some).map_err(|e| {
            Error::invalid_request(e.to_string())
                .with_details(json!({ "latitude": lat, "longitude": lng }))
        }),
        _ => Err(Error::invalid_request(
            "latitude and longitude must be provided together",
        )),
    }
}

fn parse_report_id(raw: &str) -> Result<ReportId, Error> {
    ReportId::parse(raw).map_err(|e| {
        Error::invalid_request(e.to_string()).with_details(json!({ "field": "id", "value": raw }))
    })
}

fn to_responses(reports: Vec<Report>) -> web::Json<Vec<ReportResponse>> {
    web::Json(reports.into_iter().map(ReportResponse::from).collect())
}

/// Submit a pothole report. Created `PENDING` with the base award recorded.
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created", body = ReportResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Owner account no longer exists", body = Error)
    ),
    tags = ["reports"],
    operation_id = "createReport"
)]
#[post("/reports")]
pub async fn create_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateReportRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let payload = payload.into_inner();
    let severity = parse_severity(&payload.severity, FieldName::new("severity"))?;
    let coordinates = parse_coordinates(payload.latitude, payload.longitude)?;

    let report = state
        .reports
        .submit(NewReport {
            owner,
            image: payload.image,
            description: payload.description,
            location_name: payload.location_name,
            coordinates,
            severity,
        })
        .await?;
    Ok(HttpResponse::Created().json(ReportResponse::from(report)))
}

/// All reports, newest first. Staff only; optional `status` or `severity`
/// filter (at most one).
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    params(ListFilter),
    responses(
        (status = 200, description = "Reports", body = [ReportResponse]),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Staff access required", body = Error)
    ),
    tags = ["reports"],
    operation_id = "listReports"
)]
#[get("/reports")]
pub async fn list_all_reports(
    state: web::Data<HttpState>,
    session: SessionContext,
    filter: web::Query<ListFilter>,
) -> ApiResult<web::Json<Vec<ReportResponse>>> {
    session.require_staff()?;
    let filter = filter.into_inner();
    let reports = match (filter.status, filter.severity) {
        (Some(_), Some(_)) => {
            return Err(Error::invalid_request(
                "provide at most one of status and severity",
            ))
        }
        (Some(raw), None) => {
            let status = parse_status(&raw, FieldName::new("status"))?;
            state.reports.list_by_status(status).await?
        }
        (None, Some(raw)) => {
            let severity = parse_severity(&raw, FieldName::new("severity"))?;
            state.reports.list_by_severity(severity).await?
        }
        (None, None) => state.reports.list_all().await?,
    };
    Ok(to_responses(reports))
}

/// The caller's own reports, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/reports/mine",
    responses(
        (status = 200, description = "Reports", body = [ReportResponse]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["reports"],
    operation_id = "listMyReports"
)]
#[get("/reports/mine")]
pub async fn list_my_reports(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ReportResponse>>> {
    let owner = session.require_user_id()?;
    let reports = state.reports.list_for_user(&owner).await?;
    Ok(to_responses(reports))
}

/// Publicly visible reports (`VERIFIED`, `IN_PROGRESS`, `COMPLETED`).
/// No authentication required.
#[utoipa::path(
    get,
    path = "/api/v1/reports/public",
    responses(
        (status = 200, description = "Reports", body = [ReportResponse])
    ),
    tags = ["reports"],
    operation_id = "listPublicReports",
    security([])
)]
#[get("/reports/public")]
pub async fn list_public_reports(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ReportResponse>>> {
    let reports = state.reports.list_public().await?;
    Ok(to_responses(reports))
}

/// The staff verification queue: reports still `PENDING`.
#[utoipa::path(
    get,
    path = "/api/v1/reports/pending",
    responses(
        (status = 200, description = "Reports", body = [ReportResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Staff access required", body = Error)
    ),
    tags = ["reports"],
    operation_id = "listPendingReports"
)]
#[get("/reports/pending")]
pub async fn list_pending_reports(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ReportResponse>>> {
    session.require_staff()?;
    let reports = state
        .reports
        .list_by_status(crate::domain::ReportStatus::Pending)
        .await?;
    Ok(to_responses(reports))
}

/// Reports within `radius` degrees of a centre point (bounding box).
/// No authentication required.
#[utoipa::path(
    get,
    path = "/api/v1/reports/near",
    params(NearQuery),
    responses(
        (status = 200, description = "Reports", body = [ReportResponse]),
        (status = 400, description = "Invalid coordinates or radius", body = Error)
    ),
    tags = ["reports"],
    operation_id = "listNearbyReports",
    security([])
)]
#[get("/reports/near")]
pub async fn list_nearby_reports(
    state: web::Data<HttpState>,
    query: web::Query<NearQuery>,
) -> ApiResult<web::Json<Vec<ReportResponse>>> {
    let query = query.into_inner();
    let center = Coordinates::new(query.lat, query.lng).map_err(|e| {
        Error::invalid_request(e.to_string())
            .with_details(json!({ "lat": query.lat, "lng": query.lng }))
    })?;
    if !query.radius.is_finite() || query.radius <= 0.0 {
        return Err(Error::invalid_request("radius must be a positive number")
            .with_details(json!({ "radius": query.radius })));
    }
    let reports = state
        .reports
        .list_near(BoundingRadius {
            center,
            degrees: query.radius,
        })
        .await?;
    Ok(to_responses(reports))
}

/// Fetch a single report by identifier.
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Report", body = ReportResponse),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reports"],
    operation_id = "getReport"
)]
#[get("/reports/{id}")]
pub async fn get_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReportResponse>> {
    session.require_user_id()?;
    let id = parse_report_id(&path.into_inner())?;
    let report = state.reports.get(&id).await?;
    Ok(web::Json(ReportResponse::from(report)))
}

/// Staff progress update. Applies the status change and any credit bonus in
/// one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/status",
    params(("id" = String, Path, description = "Report identifier")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Updated report", body = StatusUpdateResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Staff access required", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["reports"],
    operation_id = "updateReportStatus"
)]
#[post("/reports/{id}/status")]
pub async fn update_report_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<StatusUpdateRequest>,
) -> ApiResult<web::Json<StatusUpdateResponse>> {
    session.require_staff()?;
    let id = parse_report_id(&path.into_inner())?;
    let status = parse_status(&payload.status, FieldName::new("status"))?;
    let update = state.reports.update_status(&id, status).await?;
    Ok(web::Json(StatusUpdateResponse {
        previous_status: update.previous_status.to_string(),
        awarded: update.awarded,
        report: ReportResponse::from(update.report),
    }))
}

/// Store an image and return the reference to attach to a report.
///
/// The body is the raw image bytes; the filename travels as a query
/// parameter.
#[utoipa::path(
    post,
    path = "/api/v1/uploads/images",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Image stored", body = StoredImage),
        (status = 400, description = "Empty upload", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["reports"],
    operation_id = "uploadImage"
)]
#[post("/uploads/images")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let stored = state
        .storage
        .store_image(&query.filename, body.to_vec())
        .await
        .map_err(map_storage_error)?;
    Ok(HttpResponse::Created().json(stored))
}

fn map_storage_error(error: crate::domain::ports::ObjectStorageError) -> Error {
    use crate::domain::ports::ObjectStorageError;
    match error {
        ObjectStorageError::Unavailable { message } => {
            Error::service_unavailable(format!("object storage unavailable: {message}"))
        }
        ObjectStorageError::Rejected { message } => Error::invalid_request(message),
    }
}

#[cfg(test)]
#[path = "reports_tests.rs"]
mod tests;
