//! Diesel and pool error mapping for the document store.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::DocumentStoreError;

use super::pool::PoolError;

pub(crate) fn map_pool_error(error: PoolError) -> DocumentStoreError {
    DocumentStoreError::connection(error.message())
}

/// Map Diesel failures to store errors without leaking SQL details.
pub(crate) fn map_diesel_error(error: DieselError) -> DocumentStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DocumentStoreError::connection("database connection error")
        }
        DieselError::DeserializationError(_) | DieselError::SerializationError(_) => {
            DocumentStoreError::serialization("document column conversion failed")
        }
        _ => DocumentStoreError::query("database error"),
    }
}

pub(crate) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Map a failed write of document `id`. Unique violations, on the primary
/// key or on a unique body index, become `Conflict`.
pub(crate) fn map_write_error(
    collection: &'static str,
    id: Uuid,
) -> impl FnOnce(DieselError) -> DocumentStoreError {
    move |error| {
        if is_unique_violation(&error) {
            DocumentStoreError::conflict(collection, id)
        } else {
            map_diesel_error(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new("detail".to_owned()))
    }

    #[rstest]
    #[case(
        database_error(DatabaseErrorKind::ClosedConnection),
        DocumentStoreError::connection("database connection error")
    )]
    #[case(
        database_error(DatabaseErrorKind::UniqueViolation),
        DocumentStoreError::query("database error")
    )]
    #[case(DieselError::NotFound, DocumentStoreError::query("database error"))]
    fn maps_diesel_errors(#[case] error: DieselError, #[case] expected: DocumentStoreError) {
        assert_eq!(map_diesel_error(error), expected);
    }

    #[test]
    fn pool_errors_become_connection_errors() {
        assert_eq!(
            map_pool_error(PoolError::checkout("timed out")),
            DocumentStoreError::connection("timed out")
        );
    }

    #[test]
    fn detects_unique_violations() {
        assert!(is_unique_violation(&database_error(
            DatabaseErrorKind::UniqueViolation
        )));
        assert!(!is_unique_violation(&DieselError::NotFound));
    }

    #[rstest]
    #[case(DatabaseErrorKind::UniqueViolation, true)]
    #[case(DatabaseErrorKind::ForeignKeyViolation, false)]
    fn writes_report_unique_violations_as_conflicts(
        #[case] kind: DatabaseErrorKind,
        #[case] conflict: bool,
    ) {
        let id = Uuid::nil();
        let mapped = map_write_error("alumni_records", id)(database_error(kind));
        let expected = if conflict {
            DocumentStoreError::conflict("alumni_records", id)
        } else {
            DocumentStoreError::query("database error")
        };
        assert_eq!(mapped, expected);
    }
}
