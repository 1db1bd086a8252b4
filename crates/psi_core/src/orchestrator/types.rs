//! Core types for the orchestrator pipeline.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::command::CommandRunner;
use crate::config::PipelineConfig;
use crate::logging::ActivityLogger;
use crate::models::SampleOutputs;
use crate::orchestrator::errors::{StepError, StepResult};

/// Read-only context passed to pipeline steps.
///
/// Contains the configuration and shared resources that steps can read
/// but not modify. Mutable state goes in `RunState`.
pub struct Context {
    /// Validated pipeline configuration.
    pub config: PipelineConfig,
    /// Run name (config file stem), used in error context.
    pub run_name: String,
    /// Activity logger.
    pub logger: Arc<ActivityLogger>,
    /// Runner for external tools.
    pub runner: Arc<dyn CommandRunner>,
    /// Log file operations instead of performing them.
    pub dry_run: bool,
}

impl Context {
    /// Create a new context for a run.
    pub fn new(
        config: PipelineConfig,
        run_name: impl Into<String>,
        logger: Arc<ActivityLogger>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            run_name: run_name.into(),
            logger,
            runner,
            dry_run: false,
        }
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.config.path_to_output
    }

    /// Check that the output directory is there and is a directory.
    pub fn check_output_dir(&self) -> StepResult<()> {
        let dir = self.output_dir();
        let meta = fs::metadata(dir).map_err(|e| {
            StepError::io_error(format!("reading output directory {}", dir.display()), e)
        })?;
        if !meta.is_dir() {
            return Err(StepError::invalid_input(format!(
                "Output path is not a directory: {}",
                dir.display()
            )));
        }
        Ok(())
    }

    /// Output file layout for a sample.
    pub fn outputs(&self, sample_id: &str) -> SampleOutputs {
        SampleOutputs::new(&self.config.path_to_output, sample_id)
    }

    /// Runner as a trait object reference.
    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }
}

/// Mutable run state that accumulates results from pipeline steps.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Run identifier.
    pub run_id: String,
    /// When the run started.
    pub started_at: Option<String>,
    /// Quantification results.
    pub quantify: Option<QuantifyOutput>,
    /// Post-processing results.
    pub post_process: Option<PostProcessOutput>,
}

impl RunState {
    /// Create a new run state with the given ID.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Total number of tool invocations that failed.
    pub fn failed_commands(&self) -> usize {
        self.quantify.as_ref().map_or(0, |q| q.commands_failed)
            + self.post_process.as_ref().map_or(0, |p| p.commands_failed)
    }

    /// One-line-per-step summary for the end of the log.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(q) = &self.quantify {
            lines.push(format!(
                "Quantify: {} run, {} failed, {} already done",
                q.commands_run, q.commands_failed, q.samples_skipped
            ));
        }
        if let Some(p) = &self.post_process {
            lines.push(format!(
                "PostProcess: {} decompressed ({} failed), {} commands run, {} failed, {} events already done, {} intermediates removed",
                p.decompressed,
                p.decompress_failed,
                p.commands_run,
                p.commands_failed,
                p.events_skipped,
                p.intermediates_removed
            ));
        }
        lines
    }
}

/// Output from the Quantify step.
#[derive(Debug, Clone, Default)]
pub struct QuantifyOutput {
    /// whippet-quant invocations.
    pub commands_run: usize,
    /// Invocations that failed or could not start.
    pub commands_failed: usize,
    /// Samples skipped because a quantification already existed.
    pub samples_skipped: usize,
    /// Samples quantified successfully in this run, in order.
    pub quantified: Vec<String>,
}

/// Output from the PostProcess step.
#[derive(Debug, Clone, Default)]
pub struct PostProcessOutput {
    /// Archives decompressed.
    pub decompressed: usize,
    /// Archives missing or unreadable.
    pub decompress_failed: usize,
    /// Cleaner and annotation invocations.
    pub commands_run: usize,
    /// Invocations that failed or could not start.
    pub commands_failed: usize,
    /// Events skipped because the filtered table already existed.
    pub events_skipped: usize,
    /// Intermediate files deleted.
    pub intermediates_removed: usize,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (nothing to do, but not an error).
    Skipped(String),
}
