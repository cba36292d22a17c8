//! Classification of driver failures shared by the Diesel repositories.
//!
//! Each repository carries its own error enum, so failures are first reduced
//! to a [`DbFault`] category here and each repository decides which of its
//! variants the category maps onto. Driver detail goes to the debug log only
//! and never into a returned message.

use tracing::debug;

use super::pool::PoolError;

/// What a failed database call amounts to, stripped of driver detail.
#[derive(Debug)]
pub(crate) enum DbFault {
    /// The statement failed, or a required row was missing.
    Query(&'static str),
    /// The connection to the database is unusable.
    Connection(String),
}

impl DbFault {
    /// Classify a pool build or checkout failure.
    pub(crate) fn from_pool(error: PoolError) -> Self {
        let (PoolError::Checkout { message } | PoolError::Build { message }) = error;
        Self::Connection(message)
    }

    /// Classify a Diesel error, logging driver detail at debug level.
    pub(crate) fn from_diesel(error: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(?kind, message = info.message(), "diesel operation failed");
            }
            other => debug!(
                error_type = %std::any::type_name_of_val(other),
                "diesel operation failed"
            ),
        }

        match error {
            DieselError::NotFound => Self::Query("record not found"),
            DieselError::QueryBuilderError(_) => Self::Query("database query error"),
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::Connection("database connection error".to_owned())
            }
            _ => Self::Query("database error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn missing_row_is_a_query_fault() {
        let fault = DbFault::from_diesel(DieselError::NotFound);
        assert!(matches!(fault, DbFault::Query("record not found")));
    }

    #[rstest]
    fn closed_connection_is_a_connection_fault() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection unexpectedly".to_owned()),
        );
        let fault = DbFault::from_diesel(error);
        assert!(matches!(fault, DbFault::Connection(_)));
    }

    #[rstest]
    fn driver_detail_stays_out_of_query_faults() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_owned()),
        );
        let fault = DbFault::from_diesel(error);
        assert!(matches!(fault, DbFault::Query("database error")));
    }

    #[rstest]
    fn pool_failures_keep_their_message() {
        let fault = DbFault::from_pool(PoolError::checkout("timed out waiting for connection"));
        assert!(
            matches!(fault, DbFault::Connection(message) if message.contains("timed out"))
        );
    }
}
