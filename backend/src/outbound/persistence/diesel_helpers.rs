//! Shared error mapping for Diesel repository implementations.

use tracing::debug;

use crate::domain::ports::PersistenceError;

use super::pool::PoolError;

/// Map pool errors to domain persistence errors.
pub(crate) fn map_pool_error(error: PoolError) -> PersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to domain persistence errors.
///
/// Unique and foreign-key violations become [`PersistenceError::Conflict`]
/// carrying the constraint name so repositories can tell which constraint
/// rejected the write. Driver detail stays in debug logs.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> PersistenceError {
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
        DieselError::NotFound => PersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => PersistenceError::query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation => {
                PersistenceError::conflict(
                    info.constraint_name().unwrap_or("constraint violation"),
                )
            }
            DatabaseErrorKind::ClosedConnection => {
                PersistenceError::connection("database connection error")
            }
            _ => PersistenceError::query("database error"),
        },
        _ => PersistenceError::query("database error"),
    }
}

/// Cast a pagination offset to the `i64` Diesel expects, saturating on
/// overflow rather than panicking.
pub(crate) fn offset_for_db(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, PersistenceError::Connection { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[rstest]
    fn not_found_maps_to_query() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, PersistenceError::Query { .. }));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(42, 42)]
    #[case(u64::MAX, i64::MAX)]
    fn offsets_saturate(#[case] input: u64, #[case] expected: i64) {
        assert_eq!(offset_for_db(input), expected);
    }
}
