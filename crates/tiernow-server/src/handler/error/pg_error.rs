//! Database error to HTTP error conversion.

use tiernow_postgres::PgError;
use tiernow_postgres::error::DieselError;

use crate::handler::{Error, ErrorKind};

/// Tracing target for database error conversions.
const TRACING_TARGET: &str = "tiernow_server::handler::pg_error";

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        // Constraint violations are client mistakes (an empty tierlist
        // name, a tier reference that does not exist); everything else is
        // a store failure.
        if let Some(constraint) = error.constraint() {
            tracing::debug!(
                target: TRACING_TARGET,
                constraint = %constraint,
                error = %error,
                "database constraint violation"
            );

            return ErrorKind::BadRequest
                .with_message("The request conflicts with a data constraint")
                .with_context(format!("constraint violated: {}", constraint))
                .into_static();
        }

        match error {
            PgError::Config(message) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %message,
                    "database configuration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Timeout(timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Connection(connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Migration(migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Query(query_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "database query error"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PgError::Unexpected(message) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %message,
                    "unexpected database error"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}

impl From<DieselError> for Error<'static> {
    #[inline]
    fn from(error: DieselError) -> Self {
        PgError::from(error).into()
    }
}
