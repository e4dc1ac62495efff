//! Account API handlers.
//!
//! ```text
//! POST /api/v1/register        {"username":"jane","email":"jane@example.com","password":"..."}
//! POST /api/v1/staff/register  same body, creates a staff account
//! POST /api/v1/login           {"username":"jane","password":"..."}
//! POST /api/v1/logout
//! GET  /api/v1/profile
//! DELETE /api/v1/profile
//! POST /api/v1/credits/award   {"userId":"...","amount":25,"reason":"cleanup drive"}
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    EmailAddress, Error, PhoneNumber, RegisterUser, User, UserId, UserValidationError, Username,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account profile returned by registration, login, and profile reads.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// Stable account identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    /// Current transferred credit balance.
    pub credits: i32,
    pub is_staff: bool,
    #[schema(format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            phone_number: user.phone_number.map(|p| p.as_ref().to_owned()),
            credits: user.credits,
            is_staff: user.is_staff,
            created_at: user.created_at,
        }
    }
}

/// Manual credit award request (staff only).
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardRequest {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: Uuid,
    /// Signed amount; negative values deduct.
    pub amount: i32,
    /// Free-form justification, recorded in the structured log only.
    pub reason: String,
}

/// Manual credit award response.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardResponse {
    #[schema(value_type = String)]
    pub user_id: Uuid,
    /// Balance after the award was applied.
    pub balance: i32,
}

fn field_error(field: &str, error: &UserValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

fn parse_registration(payload: RegisterRequest, is_staff: bool) -> Result<RegisterUser, Error> {
    let username =
        Username::new(payload.username).map_err(|e| field_error("username", &e))?;
    let email = EmailAddress::new(payload.email).map_err(|e| field_error("email", &e))?;
    let phone_number = payload
        .phone_number
        .filter(|raw| !raw.trim().is_empty())
        .map(PhoneNumber::new)
        .transpose()
        .map_err(|e| field_error("phoneNumber", &e))?;
    if payload.password.is_empty() {
        return Err(Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password" })));
    }
    Ok(RegisterUser {
        username,
        email,
        phone_number,
        password: payload.password,
        is_staff,
    })
}

async fn register_account(
    state: &HttpState,
    session: &SessionContext,
    payload: RegisterRequest,
    is_staff: bool,
) -> ApiResult<HttpResponse> {
    let request = parse_registration(payload, is_staff)?;
    let user = state.users.register(request).await?;
    session.persist_user(&user)?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(user)))
}

/// Register a citizen account and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email already registered", body = Error),
        (status = 503, description = "Registry unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    register_account(&state, &session, payload.into_inner(), false).await
}

/// Register a staff account and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/staff/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Staff account created", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email already registered", body = Error),
        (status = 503, description = "Registry unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerStaff",
    security([])
)]
#[post("/staff/register")]
pub async fn staff_register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    register_account(&state, &session, payload.into_inner(), true).await
}

/// Authenticate by username and password and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Registry unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let username = Username::new(payload.username).map_err(|e| field_error("username", &e))?;
    let user = state.users.login(&username, &payload.password).await?;
    session.persist_user(&user)?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(user)))
}

/// Drop the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Current account profile including the credit balance.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "profile"
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.users.profile(&user_id).await?;
    Ok(web::Json(ProfileResponse::from(user)))
}

/// Delete the current account. Cascades to its reports and verification
/// records.
#[utoipa::path(
    delete,
    path = "/api/v1/profile",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteProfile"
)]
#[delete("/profile")]
pub async fn delete_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.users.delete_user(&user_id).await?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}

/// Manually award (or deduct) credits on an account. Staff only.
#[utoipa::path(
    post,
    path = "/api/v1/credits/award",
    request_body = AwardRequest,
    responses(
        (status = 200, description = "New balance", body = AwardResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Staff access required", body = Error),
        (status = 404, description = "Target account not found", body = Error)
    ),
    tags = ["credits"],
    operation_id = "awardCredits"
)]
#[post("/credits/award")]
pub async fn award_credits(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AwardRequest>,
) -> ApiResult<web::Json<AwardResponse>> {
    session.require_staff()?;
    let payload = payload.into_inner();
    if payload.reason.trim().is_empty() {
        return Err(Error::invalid_request("reason must not be empty")
            .with_details(json!({ "field": "reason" })));
    }
    let target = UserId::from_uuid(payload.user_id);
    let balance = state
        .users
        .award_credits(&target, payload.amount, payload.reason.trim())
        .await?;
    Ok(web::Json(AwardResponse {
        user_id: payload.user_id,
        balance,
    }))
}
