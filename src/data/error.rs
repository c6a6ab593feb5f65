//! Error taxonomy for the database lifecycle.

use sqlx::migrate::MigrateError;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The handle could not be opened: malformed connection string, wrong
    /// driver scheme, or the server rejected the session.
    #[error("failed to open database connection")]
    Connection(#[source] sqlx::Error),
    /// The handle opened but the liveness probe failed.
    #[error("failed to ping database")]
    Liveness(#[source] sqlx::Error),
    #[error("failed to create database schema")]
    Schema(#[source] MigrateError),
    #[error("database handle is already closed")]
    AlreadyClosed,
}

impl DatabaseError {
    /// Map a failure seen while probing a freshly opened pool.
    ///
    /// Errors reported by the server itself (bad credentials, unknown
    /// database) mean the session was never established. Everything else
    /// means the server could not be reached in time.
    pub(crate) fn from_probe(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(_) | sqlx::Error::Configuration(_) => Self::Connection(err),
            other => Self::Liveness(other),
        }
    }
}
