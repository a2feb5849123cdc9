// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Foliowatch - folio series availability monitor.
//!
//! This is the binary entry point. `serve` hosts the HTTP API, `poll` runs
//! the scheduler against the snapshot source, and `run` does both in one
//! process.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod serve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use foliowatch_config::{ConfigError, FolioConfig};

/// Foliowatch - folio series availability monitor.
#[derive(Parser, Debug)]
#[command(name = "foliowatch", version, about, long_about = None)]
struct Cli {
    /// Load configuration from this file instead of the standard locations.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API.
    Serve,
    /// Poll the snapshot source and submit batches.
    Poll {
        /// Run a single cycle and exit.
        #[arg(long)]
        once: bool,
    },
    /// Serve the API and poll in the same process.
    Run,
    /// Delete history older than the retention period.
    Cleanup {
        /// Override `retention.retention_days`.
        #[arg(long)]
        days: Option<i64>,
    },
    /// Inspect or change runtime settings such as alert thresholds.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print one setting.
    Get { key: String },
    /// Create or update a setting.
    Set {
        key: String,
        value: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Print every setting.
    List,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            foliowatch_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Poll { once } => serve::run_poll(config, once).await,
        Commands::Run => serve::run_all(config).await,
        Commands::Cleanup { days } => admin::run_cleanup(&config, days).await,
        Commands::Settings { action } => admin::run_settings(&config, action).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "foliowatch exited with an error");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<FolioConfig, Vec<ConfigError>> {
    match path {
        Some(path) => foliowatch_config::load_and_validate_path(path),
        None => foliowatch_config::load_and_validate(),
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("foliowatch={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_poll_once() {
        let cli = Cli::try_parse_from(["foliowatch", "poll", "--once"]).unwrap();
        assert!(matches!(cli.command, Commands::Poll { once: true }));
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_settings_set_with_global_config() {
        let cli = Cli::try_parse_from([
            "foliowatch",
            "settings",
            "set",
            "AlertThreshold_Warning",
            "150",
            "--description",
            "warn below",
            "--config",
            "/tmp/fw.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/fw.toml")));
        match cli.command {
            Commands::Settings {
                action:
                    SettingsAction::Set {
                        key,
                        value,
                        description,
                    },
            } => {
                assert_eq!(key, "AlertThreshold_Warning");
                assert_eq!(value, "150");
                assert_eq!(description.as_deref(), Some("warn below"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cleanup_days_override() {
        let cli = Cli::try_parse_from(["foliowatch", "cleanup", "--days", "30"]).unwrap();
        assert!(matches!(cli.command, Commands::Cleanup { days: Some(30) }));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["foliowatch"]).is_err());
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = foliowatch_config::load_and_validate_str("").unwrap();
        assert_eq!(config.service.name, "foliowatch");
    }
}
