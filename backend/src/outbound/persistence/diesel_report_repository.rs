//! PostgreSQL-backed `ReportRepository` implementation using Diesel ORM.
//!
//! Status mutations run inside a single transaction: the report row is
//! locked with `SELECT ... FOR UPDATE`, the transition event is dispatched to
//! the credit award policy, and the owner's balance increment commits with
//! the status change or not at all. Verification appends ride in the same
//! transaction as the transition they imply.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::credits::{bonus_for, StatusTransition, BASE_AWARD};
use crate::domain::ports::{
    BoundingRadius, ReportPersistenceError, ReportRepository, StatusUpdate, VerifiedReport,
};
use crate::domain::report::{NewReport, Report, ReportId, ReportStatus, Severity};
use crate::domain::user::UserId;
use crate::domain::verification::{NewVerification, VerificationRecord};

use super::error_mapping::{
    classify_constraint, map_basic_diesel_error, map_pool_error, ViolatedConstraint,
};
use super::models::{
    NewReportRow, NewVerificationRow, ReportRow, RowConversionError, VerificationRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{pothole_reports, users, verification_records};

/// Diesel-backed implementation of the report repository port.
#[derive(Clone)]
pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_checkout_error(error: PoolError) -> ReportPersistenceError {
    map_pool_error(error, ReportPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReportPersistenceError {
    map_basic_diesel_error(
        error,
        ReportPersistenceError::query,
        ReportPersistenceError::connection,
    )
}

fn map_mutation_error(error: diesel::result::Error, id: &ReportId) -> ReportPersistenceError {
    match error {
        diesel::result::Error::NotFound => ReportPersistenceError::not_found(id.to_string()),
        other => map_diesel_error(other),
    }
}

fn map_create_error(error: diesel::result::Error, owner: &UserId) -> ReportPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) = &error {
        if classify_constraint(info.constraint_name(), info.message())
            == ViolatedConstraint::ReportOwner
        {
            return ReportPersistenceError::owner_not_found(owner.to_string());
        }
    }
    map_diesel_error(error)
}

fn row_to_report(row: ReportRow) -> Result<Report, ReportPersistenceError> {
    Report::try_from(row).map_err(|err| ReportPersistenceError::query(err.to_string()))
}

fn rows_to_reports(rows: Vec<ReportRow>) -> Result<Vec<Report>, ReportPersistenceError> {
    rows.into_iter().map(row_to_report).collect()
}

fn deserialization_error(err: RowConversionError) -> diesel::result::Error {
    diesel::result::Error::DeserializationError(Box::new(err))
}

/// Lock the report row, apply the status change, and dispatch the transition
/// to the credit policy. Must run inside an open transaction.
async fn apply_transition(
    conn: &mut AsyncPgConnection,
    report_uuid: Uuid,
    new_status: ReportStatus,
) -> Result<(ReportRow, ReportStatus, i32), diesel::result::Error> {
    let current: ReportRow = pothole_reports::table
        .filter(pothole_reports::report_id.eq(report_uuid))
        .select(ReportRow::as_select())
        .for_update()
        .first(conn)
        .await?;

    let previous_status = ReportStatus::from_str(&current.status)
        .map_err(|err| deserialization_error(RowConversionError {
            message: err.to_string(),
        }))?;

    let updated: ReportRow = diesel::update(
        pothole_reports::table.filter(pothole_reports::report_id.eq(report_uuid)),
    )
    .set((
        pothole_reports::status.eq(new_status.as_str()),
        pothole_reports::updated_at.eq(Utc::now()),
    ))
    .returning(ReportRow::as_returning())
    .get_result(conn)
    .await?;

    let transition = StatusTransition::classify(previous_status, new_status);
    let awarded = bonus_for(transition);
    if awarded != 0 {
        diesel::update(users::table.filter(users::user_id.eq(updated.user_id)))
            .set(users::credits.eq(users::credits + awarded))
            .execute(conn)
            .await?;
    }

    Ok((updated, previous_status, awarded))
}

#[async_trait]
impl ReportRepository for DieselReportRepository {
    async fn create(&self, new_report: &NewReport) -> Result<Report, ReportPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let new_row = NewReportRow {
            report_id: *ReportId::random().as_uuid(),
            user_id: *new_report.owner.as_uuid(),
            image_url: new_report.image.as_ref().map(|i| i.url.as_str()),
            storage_key: new_report.image.as_ref().map(|i| i.key.as_str()),
            description: new_report.description.as_deref(),
            location_name: new_report.location_name.as_deref(),
            latitude: new_report.coordinates.map(|c| c.latitude()),
            longitude: new_report.coordinates.map(|c| c.longitude()),
            severity: new_report.severity.as_str(),
            status: ReportStatus::Pending.as_str(),
            credits_awarded: BASE_AWARD,
        };

        let row: ReportRow = diesel::insert_into(pothole_reports::table)
            .values(&new_row)
            .returning(ReportRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_create_error(err, &new_report.owner))?;

        row_to_report(row)
    }

    async fn find_by_id(&self, id: &ReportId) -> Result<Option<Report>, ReportPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let row = pothole_reports::table
            .filter(pothole_reports::report_id.eq(id.as_uuid()))
            .select(ReportRow::as_select())
            .first::<ReportRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_report).transpose()
    }

    async fn update_status(
        &self,
        id: &ReportId,
        new_status: ReportStatus,
    ) -> Result<StatusUpdate, ReportPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;
        let report_uuid = *id.as_uuid();

        let (row, previous_status, awarded) = conn
            .transaction::<(ReportRow, ReportStatus, i32), diesel::result::Error, _>(|conn| {
                async move { apply_transition(conn, report_uuid, new_status).await }.scope_boxed()
            })
            .await
            .map_err(|err| map_mutation_error(err, id))?;

        Ok(StatusUpdate {
            report: row_to_report(row)?,
            previous_status,
            awarded,
        })
    }

    async fn record_verification(
        &self,
        id: &ReportId,
        verification: &NewVerification,
        new_status: ReportStatus,
    ) -> Result<VerifiedReport, ReportPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;
        let report_uuid = *id.as_uuid();
        let verified_by = verification.verified_by.clone();
        let outcome = verification.outcome;
        let notes = verification.notes.clone();
        let estimated_repair_date = verification.estimated_repair_date;

        let (row, previous_status, awarded, record_row) = conn
            .transaction::<(ReportRow, ReportStatus, i32, VerificationRow), diesel::result::Error, _>(
                |conn| {
                    async move {
                        let (row, previous_status, awarded) =
                            apply_transition(conn, report_uuid, new_status).await?;

                        let record_row: VerificationRow =
                            diesel::insert_into(verification_records::table)
                                .values(&NewVerificationRow {
                                    report_id: report_uuid,
                                    verified_by: &verified_by,
                                    outcome: Some(outcome.as_str()),
                                    notes: notes.as_deref(),
                                    estimated_repair_date,
                                })
                                .returning(VerificationRow::as_returning())
                                .get_result(conn)
                                .await?;

                        Ok((row, previous_status, awarded, record_row))
                    }
                    .scope_boxed()
                },
            )
            .await
            .map_err(|err| map_mutation_error(err, id))?;

        let record = VerificationRecord::try_from(record_row)
            .map_err(|err| ReportPersistenceError::query(err.to_string()))?;

        Ok(VerifiedReport {
            record,
            update: StatusUpdate {
                report: row_to_report(row)?,
                previous_status,
                awarded,
            },
        })
    }

    async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Report>, ReportPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let rows = pothole_reports::table
            .filter(pothole_reports::user_id.eq(owner.as_uuid()))
            .order(pothole_reports::created_at.desc())
            .select(ReportRow::as_select())
            .load::<ReportRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reports(rows)
    }

    async fn list_by_status(
        &self,
        status: ReportStatus,
    ) -> Result<Vec<Report>, ReportPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let rows = pothole_reports::table
            .filter(pothole_reports::status.eq(status.as_str()))
            .order(pothole_reports::created_at.desc())
            .select(ReportRow::as_select())
            .load::<ReportRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reports(rows)
    }

    async fn list_by_severity(
        &self,
        severity: Severity,
    ) -> Result<Vec<Report>, ReportPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let rows = pothole_reports::table
            .filter(pothole_reports::severity.eq(severity.as_str()))
            .order(pothole_reports::created_at.desc())
            .select(ReportRow::as_select())
            .load::<ReportRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reports(rows)
    }

    async fn list_near(
        &self,
        radius: BoundingRadius,
    ) -> Result<Vec<Report>, ReportPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        // Approximate bounding box on the coarse (lat, lng) index, not a
        // great-circle distance query.
        let min_lat = radius.center.latitude() - radius.degrees;
        let max_lat = radius.center.latitude() + radius.degrees;
        let min_lng = radius.center.longitude() - radius.degrees;
        let max_lng = radius.center.longitude() + radius.degrees;

        let rows = pothole_reports::table
            .filter(pothole_reports::latitude.between(min_lat, max_lat))
            .filter(pothole_reports::longitude.between(min_lng, max_lng))
            .order(pothole_reports::created_at.desc())
            .select(ReportRow::as_select())
            .load::<ReportRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reports(rows)
    }

    async fn list_public(&self) -> Result<Vec<Report>, ReportPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let public = [
            ReportStatus::Verified.as_str(),
            ReportStatus::InProgress.as_str(),
            ReportStatus::Completed.as_str(),
        ];
        let rows = pothole_reports::table
            .filter(pothole_reports::status.eq_any(public))
            .order(pothole_reports::created_at.desc())
            .select(ReportRow::as_select())
            .load::<ReportRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reports(rows)
    }

    async fn list_all(&self) -> Result<Vec<Report>, ReportPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let rows = pothole_reports::table
            .order(pothole_reports::created_at.desc())
            .select(ReportRow::as_select())
            .load::<ReportRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_reports(rows)
    }
}
