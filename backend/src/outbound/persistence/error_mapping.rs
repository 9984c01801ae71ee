//! Shared Diesel failure classification and call bounding.
//!
//! Both store adapters care about the same few database outcomes: unique and
//! foreign-key violations carry meaning for the ports, closed connections are
//! connection errors, and everything else is an opaque query failure.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Port-relevant classification of a Diesel error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    UniqueViolation,
    ForeignKeyViolation,
    Connection(&'static str),
    Query(&'static str),
}

/// Classify a Diesel error, logging the database detail at debug level.
pub(crate) fn classify(error: diesel::result::Error) -> DbFailure {
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
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DbFailure::UniqueViolation
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            DbFailure::ForeignKeyViolation
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DbFailure::Connection("database connection error")
        }
        DieselError::NotFound => DbFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DbFailure::Query("database query error"),
        _ => DbFailure::Query("database error"),
    }
}

/// Run `call`, failing with `on_timeout(operation)` once `limit` elapses.
///
/// The future is dropped on expiry; the call is never retried here.
pub(crate) async fn bounded<T, E, F>(
    limit: Duration,
    operation: &'static str,
    on_timeout: impl FnOnce(&'static str) -> E,
    call: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            debug!(operation, timeout_ms = limit.as_millis(), "store call timed out");
            Err(on_timeout(operation))
        }
    }
}

/// Convert an affected-row count to the port's record count.
pub(crate) fn record_count(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}
