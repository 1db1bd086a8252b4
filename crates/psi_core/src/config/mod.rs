//! Configuration for the PSI pipeline.
//!
//! This module provides:
//! - The JSON config model (organism, analyses, sample groups, paths)
//! - Tool location defaults that a `tools` section can override
//! - Validation of group references before anything runs
//!
//! # Example
//!
//! ```no_run
//! use psi_core::config::PipelineConfig;
//!
//! let config = PipelineConfig::load("/projects/breast_cancer.json").unwrap();
//! println!("Output folder: {}", config.path_to_output.display());
//! ```

mod loader;
mod settings;

pub use loader::{ConfigError, ConfigResult};
pub use settings::{Analysis, PipelineConfig, SampleRecord, ToolSettings, SAMPLE_ROLE};
