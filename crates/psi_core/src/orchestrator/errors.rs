//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Step → Operation → Detail
//!
//! Tool failures are not errors here; they are logged by
//! [`run_logged`](crate::command::run_logged) and counted in the run state.

use std::io;

use thiserror::Error;

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Run '{run_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        run_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Failed to set up the run (output directory, activity log).
    #[error("Run '{run_name}' setup failed: {message}")]
    SetupFailed { run_name: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        run_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            run_name: run_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(run_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            run_name: run_name.into(),
            message: message.into(),
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// An analysis points at a sample group that is not in `files`.
    #[error("Analysis '{analysis}' references unknown sample group '{group}'")]
    UnknownSampleGroup { analysis: String, group: String },

    /// An analysis has no `SAMPLE` role to post-process.
    #[error("Analysis '{0}' has no SAMPLE role")]
    MissingSampleRole(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create an unknown sample group error.
    pub fn unknown_sample_group(analysis: impl Into<String>, group: impl Into<String>) -> Self {
        Self::UnknownSampleGroup {
            analysis: analysis.into(),
            group: group.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
