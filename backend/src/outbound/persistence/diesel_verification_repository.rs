//! PostgreSQL-backed read side of the verification log.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{VerificationPersistenceError, VerificationRepository};
use crate::domain::report::ReportId;
use crate::domain::verification::VerificationRecord;

use super::error_mapping::{map_basic_diesel_error, map_pool_error};
use super::models::VerificationRow;
use super::pool::{DbPool, PoolError};
use super::schema::verification_records;

/// Diesel-backed implementation of the verification log read port.
#[derive(Clone)]
pub struct DieselVerificationRepository {
    pool: DbPool,
}

impl DieselVerificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_checkout_error(error: PoolError) -> VerificationPersistenceError {
    map_pool_error(error, VerificationPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> VerificationPersistenceError {
    map_basic_diesel_error(
        error,
        VerificationPersistenceError::query,
        VerificationPersistenceError::connection,
    )
}

#[async_trait]
impl VerificationRepository for DieselVerificationRepository {
    async fn list_for_report(
        &self,
        report_id: &ReportId,
    ) -> Result<Vec<VerificationRecord>, VerificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let rows = verification_records::table
            .filter(verification_records::report_id.eq(report_id.as_uuid()))
            .order(verification_records::verified_at.desc())
            .select(VerificationRow::as_select())
            .load::<VerificationRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| {
                VerificationRecord::try_from(row)
                    .map_err(|err| VerificationPersistenceError::query(err.to_string()))
            })
            .collect()
    }
}
