//! Schema migrator.
//!
//! Migrations live in `migrations/` and are compiled into the binary. sqlx
//! records each applied version (with its checksum) in `_sqlx_migrations`, so
//! reruns against a current schema only verify and skip.

use sqlx::migrate::Migrator;
use std::time::Instant;
use tracing::info;

use super::error::DatabaseError;
use super::pool::Database;
use crate::utils::fmt_duration;

/// Every migration shipped with this build, in version order.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Bring the schema up to date. Idempotent.
pub async fn migrate(database: &Database) -> Result<(), DatabaseError> {
    run(database, &MIGRATOR).await
}

pub async fn run(database: &Database, migrator: &Migrator) -> Result<(), DatabaseError> {
    let start = Instant::now();
    info!(
        known = migrator.iter().count(),
        "running database migrations"
    );

    migrator
        .run(database.pool())
        .await
        .map_err(DatabaseError::Schema)?;

    info!(
        duration = fmt_duration(start.elapsed()),
        "database migrations completed"
    );
    Ok(())
}
