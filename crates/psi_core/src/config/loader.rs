//! Loading and validating the pipeline config file.
//!
//! Validation runs once, before any tool is started, so a bad group
//! reference stops the run instead of failing halfway through.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::settings::{PipelineConfig, SAMPLE_ROLE};

/// Errors that can occur while loading the config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Analysis '{analysis}' role '{role}' references unknown sample group '{group}'")]
    UnknownSampleGroup {
        analysis: String,
        role: String,
        group: String,
    },

    #[error("Analysis '{0}' has no SAMPLE role")]
    MissingSampleRole(String),

    #[error("No Whippet index configured for organism '{0}'")]
    UnknownOrganism(String),

    #[error("Sample '{sample}' in group '{group}' has an empty R1")]
    EmptyReadFile { group: String, sample: String },

    #[error("No event types configured")]
    NoEvents,

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl PipelineConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate config content.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: PipelineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross references and required values.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.index_path().is_none() {
            return Err(ConfigError::UnknownOrganism(self.organism.clone()));
        }

        if self.tools.events.is_empty() {
            return Err(ConfigError::NoEvents);
        }

        for (name, analysis) in self.analysis.iter() {
            if analysis.get(SAMPLE_ROLE).is_none() {
                return Err(ConfigError::MissingSampleRole(name.to_string()));
            }
            for (role, group) in analysis.iter() {
                if !self.files.contains_key(group) {
                    return Err(ConfigError::UnknownSampleGroup {
                        analysis: name.to_string(),
                        role: role.to_string(),
                        group: group.clone(),
                    });
                }
            }
        }

        for (group, records) in &self.files {
            for (sample, reads) in records.iter().flat_map(|r| r.iter()) {
                if reads.r1.trim().is_empty() {
                    return Err(ConfigError::EmptyReadFile {
                        group: group.clone(),
                        sample: sample.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_output_dir(&self) -> ConfigResult<()> {
        if !self.path_to_output.exists() {
            fs::create_dir_all(&self.path_to_output).map_err(|source| ConfigError::OutputDir {
                path: self.path_to_output.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
