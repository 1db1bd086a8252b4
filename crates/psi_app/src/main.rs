//! Whippet PSI pipeline driver - main entry point
//!
//! Handles argument parsing, application-level logging and running the
//! standard pipeline for one JSON config file.
//!
//! ```text
//! splicing-whippet-psi -c /home/luco/PROJECT/BEAUTY/BREAST_CANCER.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use psi_core::config::PipelineConfig;
use psi_core::logging::{init_tracing, LogConfig, LogLevel};
use psi_core::orchestrator::RunDriver;

/// Levels accepted by `--log-level`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LevelArg> for LogLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Trace => LogLevel::Trace,
            LevelArg::Debug => LogLevel::Debug,
            LevelArg::Info => LogLevel::Info,
            LevelArg::Warn => LogLevel::Warn,
            LevelArg::Error => LogLevel::Error,
        }
    }
}

#[derive(Parser)]
#[command(name = "splicing-whippet-psi")]
#[command(about = "Run Whippet quantification and PSI post-processing for the samples of a config file", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a JSON config file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: PathBuf,

    /// Minimum level for the activity log and stderr
    #[arg(long, value_enum, value_name = "LEVEL", default_value = "info")]
    log_level: LevelArg,

    /// Log the commands that would run without running them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = LogLevel::from(cli.log_level);
    let _log_guard = init_tracing(log_level);

    tracing::info!("Core version: {}", psi_core::version());

    let config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    let log_config = LogConfig {
        level: log_level,
        ..LogConfig::default()
    };

    let report = RunDriver::new(config, &cli.config)
        .log_config(log_config)
        .dry_run(cli.dry_run)
        .run()
        .context("Pipeline run failed")?;

    let failed = report.state.failed_commands();
    if failed > 0 {
        tracing::warn!(
            "{} tool invocation(s) failed; details in {}",
            failed,
            report.log_path.display()
        );
    } else {
        tracing::info!("Done. Activity log: {}", report.log_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_flag_is_required() {
        assert!(Cli::try_parse_from(["splicing-whippet-psi"]).is_err());
    }

    #[test]
    fn parses_short_config_flag() {
        let cli = Cli::try_parse_from(["splicing-whippet-psi", "-c", "study.json", "--dry-run"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("study.json"));
        assert_eq!(cli.log_level, LevelArg::Info);
        assert!(cli.dry_run);
    }

    #[test]
    fn log_level_accepts_listed_values_only() {
        let cli = Cli::try_parse_from(["splicing-whippet-psi", "-c", "a.json", "--log-level", "warn"])
            .unwrap();
        assert_eq!(LogLevel::from(cli.log_level), LogLevel::Warn);
        assert!(
            Cli::try_parse_from(["splicing-whippet-psi", "-c", "a.json", "--log-level", "warning"])
                .is_err()
        );
    }
}
