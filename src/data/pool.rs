//! Connection factory: open a PostgreSQL pool, probe it, fail fast.

use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::ConnectOptions;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::log::LevelFilter;
use tracing::{debug, info, warn};

use super::error::DatabaseError;
use super::health;
use super::settings::PoolSettings;
use crate::utils::{fmt_duration, log_if_slow};

/// Connection-string schemes accepted by the postgres driver.
const POSTGRES_SCHEMES: [&str; 2] = ["postgres", "postgresql"];

const SLOW_STATEMENT_THRESHOLD: Duration = Duration::from_secs(1);
const SLOW_PROBE_THRESHOLD: Duration = Duration::from_millis(500);

/// An open, pooled set of PostgreSQL connections plus the settings it was
/// built with.
///
/// Deliberately not `Clone`: the handle has a single owner, the
/// [`DatabaseService`](super::DatabaseService).
#[derive(Debug)]
pub struct Database {
    pool: PgPool,
    settings: PoolSettings,
}

impl Database {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Round-trip check against the live pool.
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        health::ping(&self.pool)
            .await
            .map_err(DatabaseError::Liveness)
    }

    /// Close every pooled connection, waiting for checked-out ones to return.
    pub(crate) async fn close(&self) {
        self.pool.close().await;
    }

    /// Build a handle around a lazily connecting pool without probing it.
    #[cfg(test)]
    pub(crate) fn lazy(url: &str, settings: PoolSettings) -> Result<Self, DatabaseError> {
        let options = parse_connection_string(url)?;
        let settings = settings.normalized();
        Ok(Self {
            pool: open_pool(options, &settings),
            settings,
        })
    }
}

/// Open a pool from a connection string and verify it with a liveness probe.
///
/// # Errors
///
/// [`DatabaseError::Connection`] when the string is empty, malformed, not a
/// postgres URL, or the server rejects the session;
/// [`DatabaseError::Liveness`] when the server cannot be reached within
/// `settings.acquire_timeout`.
pub async fn create(url: &str, settings: PoolSettings) -> Result<Database, DatabaseError> {
    let options = parse_connection_string(url)?;
    create_with(options, settings).await
}

/// Same sequence as [`create`], starting from already parsed options.
pub async fn create_with(
    options: PgConnectOptions,
    settings: PoolSettings,
) -> Result<Database, DatabaseError> {
    let settings = settings.normalized();
    let options = configure_statement_logging(options, settings.debug);

    let host = options.get_host().to_owned();
    let port = options.get_port();
    let database = options.get_database().map(str::to_owned);

    let pool = open_pool(options, &settings);
    debug!(host = %host, port, database = ?database, "database pool opened, probing");

    let start = Instant::now();
    probe_or_close(&pool).await?;
    log_if_slow(start, SLOW_PROBE_THRESHOLD, "database liveness probe");

    info!(
        host = %host,
        port,
        database = ?database,
        profile = ?settings.profile,
        max_open_connections = pool.options().get_max_connections(),
        max_idle_connections = pool.options().get_min_connections(),
        acquire_timeout = fmt_duration(settings.acquire_timeout),
        debug = settings.debug,
        probe = fmt_duration(start.elapsed()),
        "database pool established"
    );

    Ok(Database { pool, settings })
}

/// Validate the driver scheme and parse the string into connect options.
fn parse_connection_string(url: &str) -> Result<PgConnectOptions, DatabaseError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DatabaseError::Connection(sqlx::Error::Configuration(
            "connection string is empty".into(),
        )));
    }

    let parsed = url::Url::parse(url)
        .map_err(|e| DatabaseError::Connection(sqlx::Error::Configuration(Box::new(e))))?;
    if !POSTGRES_SCHEMES.contains(&parsed.scheme()) {
        return Err(DatabaseError::Connection(sqlx::Error::Configuration(
            format!(
                "unsupported driver scheme '{}', expected postgres",
                parsed.scheme()
            )
            .into(),
        )));
    }

    PgConnectOptions::from_str(url).map_err(DatabaseError::Connection)
}

fn configure_statement_logging(options: PgConnectOptions, debug: bool) -> PgConnectOptions {
    let statements = if debug {
        LevelFilter::Info
    } else {
        LevelFilter::Off
    };
    options
        .log_statements(statements)
        .log_slow_statements(LevelFilter::Warn, SLOW_STATEMENT_THRESHOLD)
}

/// Lazily open the pool; no connection is made until the first acquire.
fn open_pool(options: PgConnectOptions, settings: &PoolSettings) -> PgPool {
    let mut pool_options = PgPoolOptions::new().acquire_timeout(settings.acquire_timeout);

    if let Some(max_open) = settings.max_open_connections {
        pool_options = pool_options.max_connections(max_open);
    }
    if let Some(max_idle) = settings.max_idle_connections {
        pool_options = pool_options.min_connections(max_idle);
    }
    if let Some(idle_timeout) = settings.idle_timeout() {
        pool_options = pool_options.idle_timeout(idle_timeout);
    }
    if let Some(max_lifetime) = settings.max_lifetime() {
        pool_options = pool_options.max_lifetime(max_lifetime);
    }

    pool_options.connect_lazy_with(options)
}

/// Probe the pool. On failure the pool is closed before the error returns.
async fn probe_or_close(pool: &PgPool) -> Result<(), DatabaseError> {
    match health::probe(pool).await {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(error = %e, "database liveness probe failed, closing pool");
            pool.close().await;
            Err(DatabaseError::from_probe(e))
        }
    }
}
