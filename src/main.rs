use clap::Parser;
use database_service::app::App;
use database_service::cli::Args;
use database_service::config::Config;
use database_service::logging::setup_logging;
use std::process::ExitCode;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Logging depends on config, so config errors can only go to stderr.
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if args.migrate_only {
        config.run_migrations = true;
    }
    setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = if cfg!(debug_assertions) {
            "development"
        } else {
            "production"
        },
        migrate_only = args.migrate_only,
        "starting database-service"
    );
    debug!(config = ?config, "configuration loaded");

    let app = match App::new(config).await {
        Ok(app) => app,
        Err(e) => {
            error!(error = ?e, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    if args.migrate_only {
        info!("migrations applied, exiting");
        return app.finish().await;
    }

    app.run().await
}
