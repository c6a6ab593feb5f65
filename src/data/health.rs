//! Database liveness checks.

use sqlx::{Connection, PgPool};

/// Verify the database connection is alive.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Acquire one connection and ping it at the protocol level.
///
/// Used right after the pool is opened, when the first acquire is also the
/// first real connection attempt.
pub(crate) async fn probe(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    conn.ping().await
}
