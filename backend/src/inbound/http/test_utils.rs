//! Test helpers for inbound HTTP components.
//!
//! `StubBackend` implements every outbound port in memory so handler tests
//! exercise the full request path (session, validation, service, port)
//! without a database or filesystem.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;

use crate::domain::credits::{bonus_for, StatusTransition, BASE_AWARD};
use crate::domain::ports::{
    BoundingRadius, CredentialHashError, CredentialHasher, ObjectStorage, ObjectStorageError,
    ReportAnalyticsBucket, ReportPersistenceError, ReportRepository, StatusUpdate, SummaryQuery,
    SummaryQueryError, UserPersistenceError, UserReportSummary, UserRepository,
    VerificationPersistenceError, VerificationRepository, VerifiedReport,
};
use crate::domain::{
    NewReport, NewUser, NewVerification, Report, ReportId, ReportService, ReportStatus, Severity,
    StoredImage, User, UserId, UserService, Username, VerificationRecord,
};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

#[derive(Default)]
struct BackendState {
    users: HashMap<UserId, User>,
    reports: HashMap<ReportId, Report>,
    verifications: Vec<VerificationRecord>,
    stored_images: Vec<StoredImage>,
}

/// In-memory implementation of every outbound port.
#[derive(Default)]
pub struct StubBackend {
    state: Mutex<BackendState>,
}

impl StubBackend {
    /// Current credit balance of a user, zero when unknown.
    pub fn balance_of(&self, id: &UserId) -> i32 {
        let state = self.state.lock().expect("state lock");
        state.users.get(id).map(|u| u.credits).unwrap_or_default()
    }

    /// Images handed to the storage port so far.
    pub fn stored_images(&self) -> Vec<StoredImage> {
        let state = self.state.lock().expect("state lock");
        state.stored_images.clone()
    }

    fn apply_transition(
        state: &mut BackendState,
        id: &ReportId,
        new_status: ReportStatus,
    ) -> Result<StatusUpdate, ReportPersistenceError> {
        let report = state
            .reports
            .get_mut(id)
            .ok_or_else(|| ReportPersistenceError::not_found(id.to_string()))?;
        let previous_status = report.status;
        let transition = StatusTransition::classify(previous_status, new_status);
        let awarded = bonus_for(transition);

        report.status = new_status;
        report.updated_at = Utc::now();
        let snapshot = report.clone();

        if awarded != 0 {
            if let Some(owner) = state.users.get_mut(&snapshot.owner) {
                owner.credits += awarded;
            }
        }

        Ok(StatusUpdate {
            report: snapshot,
            previous_status,
            awarded,
        })
    }
}

#[async_trait]
impl UserRepository for StubBackend {
    async fn create(&self, new_user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        if state.users.values().any(|u| u.username == new_user.username) {
            return Err(UserPersistenceError::duplicate_username(
                new_user.username.to_string(),
            ));
        }
        if state.users.values().any(|u| u.email == new_user.email) {
            return Err(UserPersistenceError::duplicate_email(
                new_user.email.to_string(),
            ));
        }
        let user = User {
            id: UserId::random(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            phone_number: new_user.phone_number.clone(),
            password_hash: new_user.password_hash.clone(),
            credits: 0,
            is_staff: new_user.is_staff,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.users.values().find(|u| &u.username == username).cloned())
    }

    async fn adjust_credits(&self, id: &UserId, delta: i32) -> Result<i32, UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserPersistenceError::not_found(id.to_string()))?;
        user.credits += delta;
        Ok(user.credits)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        if state.users.remove(id).is_none() {
            return Err(UserPersistenceError::not_found(id.to_string()));
        }
        let owned: Vec<ReportId> = state
            .reports
            .values()
            .filter(|r| &r.owner == id)
            .map(|r| r.id)
            .collect();
        for report_id in owned {
            state.reports.remove(&report_id);
            state.verifications.retain(|v| v.report_id != report_id);
        }
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for StubBackend {
    async fn create(&self, new_report: &NewReport) -> Result<Report, ReportPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        if !state.users.contains_key(&new_report.owner) {
            return Err(ReportPersistenceError::owner_not_found(
                new_report.owner.to_string(),
            ));
        }
        let now = Utc::now();
        let report = Report {
            id: ReportId::random(),
            owner: new_report.owner,
            image: new_report.image.clone(),
            description: new_report.description.clone(),
            location_name: new_report.location_name.clone(),
            coordinates: new_report.coordinates,
            severity: new_report.severity,
            status: ReportStatus::Pending,
            credits_awarded: BASE_AWARD,
            created_at: now,
            updated_at: now,
        };
        state.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn find_by_id(&self, id: &ReportId) -> Result<Option<Report>, ReportPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.reports.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &ReportId,
        new_status: ReportStatus,
    ) -> Result<StatusUpdate, ReportPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        Self::apply_transition(&mut state, id, new_status)
    }

    async fn record_verification(
        &self,
        id: &ReportId,
        verification: &NewVerification,
        new_status: ReportStatus,
    ) -> Result<VerifiedReport, ReportPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        let update = Self::apply_transition(&mut state, id, new_status)?;
        let record = VerificationRecord {
            report_id: *id,
            verified_by: verification.verified_by.clone(),
            outcome: Some(verification.outcome),
            notes: verification.notes.clone(),
            verified_at: Utc::now(),
            estimated_repair_date: verification.estimated_repair_date,
        };
        state.verifications.push(record.clone());
        Ok(VerifiedReport { record, update })
    }

    async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Report>, ReportPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .reports
            .values()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect())
    }

    async fn list_by_status(
        &self,
        status: ReportStatus,
    ) -> Result<Vec<Report>, ReportPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .reports
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    async fn list_by_severity(
        &self,
        severity: Severity,
    ) -> Result<Vec<Report>, ReportPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .reports
            .values()
            .filter(|r| r.severity == severity)
            .cloned()
            .collect())
    }

    async fn list_near(
        &self,
        radius: BoundingRadius,
    ) -> Result<Vec<Report>, ReportPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .reports
            .values()
            .filter(|r| {
                r.coordinates.is_some_and(|c| {
                    (c.latitude() - radius.center.latitude()).abs() <= radius.degrees
                        && (c.longitude() - radius.center.longitude()).abs() <= radius.degrees
                })
            })
            .cloned()
            .collect())
    }

    async fn list_public(&self) -> Result<Vec<Report>, ReportPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .reports
            .values()
            .filter(|r| r.status.is_public())
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Report>, ReportPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.reports.values().cloned().collect())
    }
}

#[async_trait]
impl VerificationRepository for StubBackend {
    async fn list_for_report(
        &self,
        report_id: &ReportId,
    ) -> Result<Vec<VerificationRecord>, VerificationPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .verifications
            .iter()
            .filter(|v| &v.report_id == report_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SummaryQuery for StubBackend {
    async fn user_summaries(&self) -> Result<Vec<UserReportSummary>, SummaryQueryError> {
        let state = self.state.lock().expect("state lock");
        let mut summaries: Vec<UserReportSummary> = state
            .users
            .values()
            .filter(|u| !u.is_staff)
            .map(|user| {
                let owned: Vec<&Report> = state
                    .reports
                    .values()
                    .filter(|r| r.owner == user.id)
                    .collect();
                UserReportSummary {
                    user_id: *user.id.as_uuid(),
                    username: user.username.to_string(),
                    total_reports: owned.len() as i64,
                    completed_reports: owned
                        .iter()
                        .filter(|r| r.status == ReportStatus::Completed)
                        .count() as i64,
                    total_base_credits: owned
                        .iter()
                        .map(|r| i64::from(r.credits_awarded))
                        .sum(),
                    last_report_at: owned.iter().map(|r| r.created_at).max(),
                }
            })
            .collect();
        summaries.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(summaries)
    }

    async fn report_analytics(&self) -> Result<Vec<ReportAnalyticsBucket>, SummaryQueryError> {
        let state = self.state.lock().expect("state lock");
        let mut buckets: HashMap<(ReportStatus, Severity, chrono::NaiveDate), (i64, i64)> =
            HashMap::new();
        for report in state.reports.values() {
            let entry = buckets
                .entry((report.status, report.severity, report.created_at.date_naive()))
                .or_default();
            entry.0 += 1;
            entry.1 += i64::from(report.credits_awarded);
        }
        let mut result: Vec<ReportAnalyticsBucket> = buckets
            .into_iter()
            .map(|((status, severity, day), (count, total))| ReportAnalyticsBucket {
                status,
                severity,
                day,
                report_count: count,
                avg_base_credits: total as f64 / count as f64,
            })
            .collect();
        result.sort_by(|a, b| b.day.cmp(&a.day));
        Ok(result)
    }
}

#[async_trait]
impl ObjectStorage for StubBackend {
    async fn store_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredImage, ObjectStorageError> {
        if bytes.is_empty() {
            return Err(ObjectStorageError::rejected("empty upload"));
        }
        let stored = StoredImage {
            url: format!("/media/test/{filename}"),
            key: format!("test/{filename}"),
        };
        let mut state = self.state.lock().expect("state lock");
        state.stored_images.push(stored.clone());
        Ok(stored)
    }
}

/// Deterministic hasher so tests never pay the argon2 cost.
pub struct StubHasher;

impl CredentialHasher for StubHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialHashError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHashError> {
        Ok(hash == format!("hashed:{password}"))
    }
}

/// Build an `HttpState` wired entirely over the stub backend.
pub fn stub_state() -> (web::Data<HttpState>, Arc<StubBackend>) {
    let backend = Arc::new(StubBackend::default());
    let users = Arc::new(UserService::new(backend.clone(), Arc::new(StubHasher)));
    let reports = Arc::new(ReportService::new(backend.clone(), backend.clone()));
    let state = HttpState::new(users, reports, backend.clone(), backend.clone());
    (web::Data::new(state), backend)
}
