//! Handler coverage for the verification endpoints.

use actix_web::http::StatusCode;
use actix_web::{test as actix_test, web, App};
use rstest::rstest;
use serde_json::Value;
use uuid::Uuid;

use super::*;
use crate::domain::UserId;
use crate::inbound::http::reports::{create_report, get_report, CreateReportRequest};
use crate::inbound::http::test_utils::{stub_state, test_session_middleware};
use crate::inbound::http::users::{delete_profile, register, staff_register, RegisterRequest};

fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).wrap(test_session_middleware()).service(
        web::scope("/api/v1")
            .service(register)
            .service(staff_register)
            .service(create_report)
            .service(delete_profile)
            .service(verify_report)
            .service(list_verifications)
            .service(get_report),
    )
}

async fn session_for<S, B>(app: &S, path: &str, username: &str) -> actix_web::cookie::Cookie<'static>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri(path)
            .set_json(&RegisterRequest {
                username: username.into(),
                email: format!("{username}@example.com"),
                phone_number: None,
                password: "hunter2".into(),
            })
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned()
}

async fn submit_report<S, B>(app: &S, cookie: &actix_web::cookie::Cookie<'static>) -> Value
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let response = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/reports")
            .cookie(cookie.clone())
            .set_json(&CreateReportRequest {
                severity: "HIGH".into(),
                description: Some("deep pothole".into()),
                location_name: None,
                latitude: Some(40.7128),
                longitude: Some(-74.0060),
                image: None,
            })
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = actix_test::read_body(response).await;
    serde_json::from_slice(&bytes).expect("report json")
}

#[rstest]
#[case("APPROVED", "VERIFIED", 10)]
#[case("REJECTED", "REJECTED", 0)]
#[actix_web::test]
async fn verification_applies_the_implied_transition(
    #[case] outcome: &str,
    #[case] expected_status: &str,
    #[case] expected_award: i64,
) {
    let (state, backend) = stub_state();
    let app = actix_test::init_service(test_app(state)).await;
    let citizen = session_for(&app, "/api/v1/register", "jane").await;
    let staff = session_for(&app, "/api/v1/staff/register", "inspector").await;

    let report = submit_report(&app, &citizen).await;
    let report_id = report["id"].as_str().expect("id").to_owned();
    let owner: Uuid = serde_json::from_value(report["owner"].clone()).expect("owner uuid");

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/reports/{report_id}/verify"))
            .cookie(staff)
            .set_json(&VerifyRequest {
                outcome: outcome.into(),
                notes: Some("checked on site".into()),
                estimated_repair_date: Some("2026-09-01".into()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = actix_test::read_body(response).await;
    let value: Value = serde_json::from_slice(&bytes).expect("verify json");
    assert_eq!(value["report"]["status"], expected_status);
    assert_eq!(value["awarded"], expected_award);
    assert_eq!(value["record"]["verifiedBy"], "inspector");
    assert_eq!(value["record"]["outcome"], outcome);
    assert_eq!(value["record"]["estimatedRepairDate"], "2026-09-01");
    assert_eq!(
        i64::from(backend.balance_of(&UserId::from_uuid(owner))),
        expected_award
    );
}

#[actix_web::test]
async fn citizens_cannot_verify() {
    let (state, _backend) = stub_state();
    let app = actix_test::init_service(test_app(state)).await;
    let citizen = session_for(&app, "/api/v1/register", "jane").await;

    let report = submit_report(&app, &citizen).await;
    let report_id = report["id"].as_str().expect("id").to_owned();

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/reports/{report_id}/verify"))
            .cookie(citizen)
            .set_json(&VerifyRequest {
                outcome: "APPROVED".into(),
                notes: None,
                estimated_repair_date: None,
            })
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn malformed_repair_date_is_rejected() {
    let (state, _backend) = stub_state();
    let app = actix_test::init_service(test_app(state)).await;
    let citizen = session_for(&app, "/api/v1/register", "jane").await;
    let staff = session_for(&app, "/api/v1/staff/register", "inspector").await;

    let report = submit_report(&app, &citizen).await;
    let report_id = report["id"].as_str().expect("id").to_owned();

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/reports/{report_id}/verify"))
            .cookie(staff)
            .set_json(&VerifyRequest {
                outcome: "APPROVED".into(),
                notes: None,
                estimated_repair_date: Some("01/09/2026".into()),
            })
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn history_accumulates_re_verifications() {
    let (state, _backend) = stub_state();
    let app = actix_test::init_service(test_app(state)).await;
    let citizen = session_for(&app, "/api/v1/register", "jane").await;
    let staff = session_for(&app, "/api/v1/staff/register", "inspector").await;

    let report = submit_report(&app, &citizen).await;
    let report_id = report["id"].as_str().expect("id").to_owned();

    for outcome in ["NEED_INFO", "APPROVED"] {
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/v1/reports/{report_id}/verify"))
                .cookie(staff.clone())
                .set_json(&VerifyRequest {
                    outcome: outcome.into(),
                    notes: None,
                    estimated_repair_date: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/reports/{report_id}/verifications"))
            .cookie(citizen)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = actix_test::read_body(response).await;
    let history: Vec<Value> = serde_json::from_slice(&bytes).expect("history json");
    assert_eq!(history.len(), 2);
}

#[actix_web::test]
async fn deleting_the_owner_removes_reports_and_history() {
    let (state, _backend) = stub_state();
    let app = actix_test::init_service(test_app(state)).await;
    let citizen = session_for(&app, "/api/v1/register", "jane").await;
    let staff = session_for(&app, "/api/v1/staff/register", "inspector").await;

    let report = submit_report(&app, &citizen).await;
    let report_id = report["id"].as_str().expect("id").to_owned();

    let verify = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/reports/{report_id}/verify"))
            .cookie(staff.clone())
            .set_json(&VerifyRequest {
                outcome: "APPROVED".into(),
                notes: None,
                estimated_repair_date: None,
            })
            .to_request(),
    )
    .await;
    assert_eq!(verify.status(), StatusCode::OK);

    let deleted = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/profile")
            .cookie(citizen)
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let report_after = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/reports/{report_id}"))
            .cookie(staff.clone())
            .to_request(),
    )
    .await;
    assert_eq!(report_after.status(), StatusCode::NOT_FOUND);

    let history_after = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/reports/{report_id}/verifications"))
            .cookie(staff)
            .to_request(),
    )
    .await;
    assert_eq!(history_after.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn history_of_unknown_report_is_not_found() {
    let (state, _backend) = stub_state();
    let app = actix_test::init_service(test_app(state)).await;
    let citizen = session_for(&app, "/api/v1/register", "jane").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/reports/{}/verifications", Uuid::new_v4()))
            .cookie(citizen)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
