//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: all HTTP endpoints from the inbound layer, the request
//! and response schemas, and the session cookie security scheme. The
//! generated document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{ReportAnalyticsBucket, UserReportSummary};
use crate::domain::{Error, ErrorCode, StoredImage};
use crate::inbound::http::reports::{
    CreateReportRequest, ReportResponse, StatusUpdateRequest, StatusUpdateResponse,
};
use crate::inbound::http::users::{
    AwardRequest, AwardResponse, LoginRequest, ProfileResponse, RegisterRequest,
};
use crate::inbound::http::verifications::{
    VerificationRecordResponse, VerifyRequest, VerifyResponse,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Pothole reporting API",
        description = "Citizen pothole reports, staff verification, and credit awards."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::staff_register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::profile,
        crate::inbound::http::users::delete_profile,
        crate::inbound::http::users::award_credits,
        crate::inbound::http::reports::create_report,
        crate::inbound::http::reports::list_all_reports,
        crate::inbound::http::reports::list_my_reports,
        crate::inbound::http::reports::list_public_reports,
        crate::inbound::http::reports::list_pending_reports,
        crate::inbound::http::reports::list_nearby_reports,
        crate::inbound::http::reports::get_report,
        crate::inbound::http::reports::update_report_status,
        crate::inbound::http::reports::upload_image,
        crate::inbound::http::verifications::verify_report,
        crate::inbound::http::verifications::list_verifications,
        crate::inbound::http::summaries::user_summaries,
        crate::inbound::http::summaries::report_analytics,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        StoredImage,
        RegisterRequest,
        LoginRequest,
        ProfileResponse,
        AwardRequest,
        AwardResponse,
        CreateReportRequest,
        StatusUpdateRequest,
        ReportResponse,
        StatusUpdateResponse,
        VerifyRequest,
        VerificationRecordResponse,
        VerifyResponse,
        UserReportSummary,
        ReportAnalyticsBucket,
    )),
    tags(
        (name = "users", description = "Accounts, sessions, and profiles"),
        (name = "reports", description = "Pothole report lifecycle"),
        (name = "verifications", description = "Staff verification decisions"),
        (name = "credits", description = "Manual credit awards"),
        (name = "summaries", description = "Aggregated reporting views"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
