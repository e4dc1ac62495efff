//! Shared Diesel error mapping for the repository adapters.
//!
//! Uniqueness and foreign-key violations carry meaning in this schema
//! (duplicate registration, dangling report owner), so the mapping inspects
//! constraint information before falling back to generic query errors.

use tracing::{debug, warn};

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Which database constraint a violation touched, judged by constraint name
/// with a message fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ViolatedConstraint {
    Username,
    Email,
    ReportOwner,
    ReportReference,
    Other,
}

pub(crate) fn classify_constraint(
    constraint_name: Option<&str>,
    message: &str,
) -> ViolatedConstraint {
    let haystack = constraint_name.unwrap_or(message).to_lowercase();
    if haystack.contains("username") {
        ViolatedConstraint::Username
    } else if haystack.contains("email") {
        ViolatedConstraint::Email
    } else if haystack.contains("pothole_reports_user_id") {
        ViolatedConstraint::ReportOwner
    } else if haystack.contains("verification_records_report_id") {
        ViolatedConstraint::ReportReference
    } else {
        ViolatedConstraint::Other
    }
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Repositories with richer semantics (uniqueness, FK resolution) intercept
/// `DatabaseError` first and delegate the remainder here.
pub(crate) fn map_basic_diesel_error<E, Q, C>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(kind, _) => {
            if matches!(
                kind,
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation
            ) {
                // Callers should have classified these; reaching here means a
                // constraint this adapter does not know about.
                warn!("unclassified constraint violation reached basic mapping");
            }
            query("database error")
        }
        _ => query("database error"),
    }
}
