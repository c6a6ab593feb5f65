use crate::config::Config;
use crate::data::{self, Database, DatabaseService};
use crate::signals::shutdown_signal;
use crate::state::AppState;
use crate::web::server::WebServer;
use anyhow::Context;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Apply migrations when enabled.
///
/// A handle whose migration failed is closed before the error is returned.
pub async fn prepare_schema(
    database: &Database,
    run_migrations: bool,
) -> Result<(), anyhow::Error> {
    if !run_migrations {
        info!("database migrations disabled, skipping");
        return Ok(());
    }

    if let Err(e) = data::migrate(database).await {
        database.close().await;
        return Err(e).context("Failed to run database migrations");
    }
    Ok(())
}

/// Main application struct: configuration plus the one database service.
pub struct App {
    config: Config,
    db: Arc<DatabaseService>,
}

impl App {
    /// Connect, probe and (when enabled) migrate.
    ///
    /// Any failure here is fatal: no listener is bound until this returns
    /// successfully, and a handle whose migration failed is closed before the
    /// error is returned.
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        let database = data::create(&config.database_url, config.pool_settings())
            .await
            .context("Failed to establish database pool")?;

        prepare_schema(&database, config.run_migrations).await?;

        Ok(App {
            config,
            db: Arc::new(DatabaseService::new(database)),
        })
    }

    /// Serve until a shutdown signal or a server error, then close the pool.
    pub async fn run(self) -> ExitCode {
        let addr = SocketAddr::new(self.config.host, self.config.port);
        let mut server = match WebServer::start(addr, AppState::new(self.db.clone())).await {
            Ok(server) => server,
            Err(e) => {
                error!(address = %addr, error = %e, "failed to bind web server");
                self.close_database().await;
                return ExitCode::FAILURE;
            }
        };

        enum Exit {
            Signal,
            Server(Result<(), anyhow::Error>),
        }

        let exit = tokio::select! {
            result = server.wait() => Exit::Server(result),
            () = shutdown_signal() => Exit::Signal,
        };

        let code = match exit {
            Exit::Signal => {
                if server.shutdown(self.config.shutdown_timeout).await {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            Exit::Server(Ok(())) => {
                warn!("web server stopped without a shutdown signal");
                ExitCode::SUCCESS
            }
            Exit::Server(Err(e)) => {
                error!(error = ?e, "web server stopped unexpectedly");
                ExitCode::FAILURE
            }
        };

        self.close_database().await;
        info!("shutdown complete");
        code
    }

    /// Close the pool and exit; used after a migration-only run.
    pub async fn finish(self) -> ExitCode {
        self.close_database().await;
        ExitCode::SUCCESS
    }

    async fn close_database(&self) {
        if let Err(e) = self.db.close().await {
            warn!(error = %e, "database close failed");
        }
    }
}
