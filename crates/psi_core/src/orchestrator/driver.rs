//! Run driver tying config, activity log and pipeline together.
//!
//! The driver opens `activity.log` in the output directory, writes the run
//! header (config file, output path, organism, index) and runs the standard
//! pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::command::{CommandRunner, DryRunRunner, SystemRunner};
use crate::config::PipelineConfig;
use crate::logging::{ActivityLogger, LogConfig};

use super::errors::{PipelineError, PipelineResult};
use super::types::{Context, RunState};
use super::{create_standard_pipeline, PipelineRunResult};

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Accumulated step results.
    pub state: RunState,
    /// Steps completed and skipped.
    pub result: PipelineRunResult,
    /// Activity log location.
    pub log_path: PathBuf,
}

/// Drives one pipeline run for a loaded config.
///
/// # Example
///
/// ```ignore
/// let config = PipelineConfig::load(&config_path)?;
/// let report = RunDriver::new(config, &config_path).dry_run(true).run()?;
/// println!("Log: {}", report.log_path.display());
/// ```
pub struct RunDriver {
    config: PipelineConfig,
    config_path: PathBuf,
    log_config: LogConfig,
    runner: Option<Arc<dyn CommandRunner>>,
    dry_run: bool,
}

impl RunDriver {
    pub fn new(config: PipelineConfig, config_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            config_path: config_path.into(),
            log_config: LogConfig::default(),
            runner: None,
            dry_run: false,
        }
    }

    /// Set the activity log configuration.
    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Use a specific command runner instead of the system one.
    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Log commands and file operations without performing them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run name derived from the config file stem.
    pub fn run_name(&self) -> String {
        run_name_for(&self.config_path)
    }

    /// Run the standard pipeline.
    pub fn run(self) -> PipelineResult<RunReport> {
        let run_name = self.run_name();

        self.config
            .ensure_output_dir()
            .map_err(|e| PipelineError::setup_failed(&run_name, e.to_string()))?;

        let logger = ActivityLogger::new(&self.config.path_to_output, self.log_config.clone())
            .map_err(|e| {
                PipelineError::setup_failed(&run_name, format!("Failed to open activity log: {}", e))
            })?;
        let logger = Arc::new(logger);
        let log_path = logger.log_path().to_path_buf();

        logger.info("");
        logger.info("=========> START:");
        logger.info(&format!("file_config : {}", self.config_path.display()));
        logger.info(&format!(
            "path_to_output : {}",
            self.config.path_to_output.display()
        ));
        logger.info(&format!("organism : {}", self.config.organism));
        if let Some(index) = self.config.index_path() {
            logger.info(&format!("index_path : {}", index.display()));
        }
        if self.dry_run {
            logger.warn("Dry run: tools are not executed and no files are changed");
        }

        let runner: Arc<dyn CommandRunner> = match (self.runner, self.dry_run) {
            (Some(runner), _) => runner,
            (None, true) => Arc::new(DryRunRunner),
            (None, false) => Arc::new(SystemRunner),
        };

        let ctx = Context::new(self.config, &run_name, Arc::clone(&logger), runner)
            .with_dry_run(self.dry_run);
        let mut state = RunState::new(&run_name);

        let result = create_standard_pipeline().run(&ctx, &mut state)?;
        logger.flush();

        Ok(RunReport {
            state,
            result,
            log_path,
        })
    }
}

fn run_name_for(config_path: &Path) -> String {
    config_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::test_support::{RecordingRunner, MINIMAL_CONFIG};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn run_name_is_config_stem() {
        assert_eq!(run_name_for(Path::new("/p/BREAST_CANCER.json")), "BREAST_CANCER");
        assert_eq!(run_name_for(Path::new("")), "run");
    }

    #[test]
    fn writes_run_header_and_creates_output_dir() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("results");
        let json = MINIMAL_CONFIG.replace("{out}", &out.display().to_string());
        let config = PipelineConfig::from_json_str(&json).unwrap();

        let report = RunDriver::new(config, "/p/study.json")
            .runner(Arc::new(RecordingRunner::succeeding()))
            .run()
            .unwrap();

        assert!(out.is_dir());
        assert_eq!(report.state.run_id, "study");
        assert_eq!(report.result.steps_completed, vec!["Quantify", "PostProcess"]);

        let log = fs::read_to_string(&report.log_path).unwrap();
        assert!(log.contains("=========> START:"));
        assert!(log.contains("file_config : /p/study.json"));
        assert!(log.contains("organism : human"));
        assert!(log.contains("index_path : /idx/human"));
    }

    #[test]
    fn dry_run_uses_no_real_tools() {
        let dir = tempdir().unwrap();
        let json = MINIMAL_CONFIG.replace("{out}", &dir.path().display().to_string());
        let config = PipelineConfig::from_json_str(&json).unwrap();

        let report = RunDriver::new(config, "dry.json").dry_run(true).run().unwrap();

        let quantify = report.state.quantify.unwrap();
        assert_eq!(quantify.commands_run, 3);
        assert_eq!(quantify.commands_failed, 0);
        assert!(!dir.path().join("KO1.psi").exists());
    }
}
