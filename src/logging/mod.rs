use crate::cli::TracingFormat;
use crate::config::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Build the default filter directive for a config.
///
/// Statement logs from sqlx are emitted under `sqlx::query`; they surface at
/// INFO only when the debug flag is on.
pub fn default_directives(config: &Config) -> String {
    let base_level = &config.log_level;
    let sql_level = if config.sql_debug() { "info" } else { "warn" };
    format!("warn,database_service={base_level},sqlx::query={sql_level}")
}

/// Configure and initialize logging for the application.
///
/// `RUST_LOG`, when set, replaces the config-derived filter entirely.
pub fn setup_logging(config: &Config, tracing_format: TracingFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    match tracing_format {
        TracingFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).compact())
                .init();
        }
        TracingFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .json()
                        .flatten_event(true),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn sql_statements_surface_only_in_debug_mode() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("DATABASE_URL", "postgres://localhost/app");
            jail.set_env("LOG_LEVEL", "debug");

            let config = Config::load(None)?;
            assert_eq!(
                default_directives(&config),
                "warn,database_service=debug,sqlx::query=warn"
            );

            jail.set_env("DB_DEBUG", "true");
            let config = Config::load(None)?;
            assert_eq!(
                default_directives(&config),
                "warn,database_service=debug,sqlx::query=info"
            );
            Ok(())
        });
    }
}
