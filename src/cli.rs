//! Command line arguments.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "PostgreSQL-backed database service")]
pub struct Args {
    /// Log output format
    #[arg(long, value_enum, default_value_t = TracingFormat::default())]
    pub tracing: TracingFormat,

    /// Optional TOML config file, merged under environment variables
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Connect, apply migrations, close the pool and exit
    #[arg(long)]
    pub migrate_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingFormat {
    /// Human-readable, for terminals
    Pretty,
    /// One JSON object per line, for log shippers
    Json,
}

impl Default for TracingFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::parse_from([
            "database-service",
            "--tracing",
            "json",
            "--config",
            "/etc/database-service.toml",
            "--migrate-only",
        ]);
        assert_eq!(args.tracing, TracingFormat::Json);
        assert_eq!(
            args.config.as_deref(),
            Some(std::path::Path::new("/etc/database-service.toml"))
        );
        assert!(args.migrate_only);
    }

    #[test]
    fn clap_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
