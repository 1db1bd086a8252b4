//! Pipeline configuration read from the JSON config file.
//!
//! The top-level keys mirror the config files already in use
//! (`organism`, `analysis`, `files`, `path_to_*`). External tool locations
//! live in an optional `tools` section whose fields all have defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{EventType, ReadPair, Sample};

/// Role whose sample group is post-processed after quantification.
pub const SAMPLE_ROLE: &str = "SAMPLE";

/// Role name to sample-group name, in file order.
pub type Analysis = IndexMap<String, String>;

/// One entry of a sample group: sample identifier to reads, in file order.
pub type SampleRecord = IndexMap<String, ReadPair>;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Organism name, used to pick the Whippet index and passed to the
    /// annotation script.
    pub organism: String,

    /// Directory the read-file names are relative to.
    pub path_to_input: PathBuf,

    /// Directory receiving quantifications, filtered tables and the
    /// activity log.
    pub path_to_output: PathBuf,

    /// Executable that filters a `.psi` table down to one event type.
    pub path_to_cleaner: PathBuf,

    /// Analysis name to role mapping.
    pub analysis: IndexMap<String, Analysis>,

    /// Sample-group name to its ordered sample records.
    pub files: HashMap<String, Vec<SampleRecord>>,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,
}

impl PipelineConfig {
    /// Whippet index for the configured organism.
    pub fn index_path(&self) -> Option<&Path> {
        self.tools.indexes.get(&self.organism).map(PathBuf::as_path)
    }

    /// Records of a sample group, if the group exists.
    pub fn sample_group(&self, name: &str) -> Option<&[SampleRecord]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Samples of a group flattened across records, in file order.
    pub fn samples_in_group(&self, name: &str) -> Option<Vec<Sample>> {
        self.sample_group(name).map(|records| {
            records
                .iter()
                .flat_map(|record| record.iter())
                .map(|(id, reads)| Sample {
                    id: id.clone(),
                    reads: reads.clone(),
                })
                .collect()
        })
    }

    /// Group named by an analysis's `SAMPLE` role.
    pub fn post_process_group<'a>(&'a self, analysis: &'a Analysis) -> Option<&'a str> {
        analysis.get(SAMPLE_ROLE).map(String::as_str)
    }
}

/// Locations of the external tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Julia interpreter used to launch whippet-quant.
    #[serde(default = "default_julia")]
    pub julia: String,

    /// Path to `whippet-quant.jl`.
    #[serde(default = "default_whippet_quant")]
    pub whippet_quant: PathBuf,

    /// R script interpreter.
    #[serde(default = "default_rscript")]
    pub rscript: String,

    /// Gene-symbol annotation script.
    #[serde(default = "default_annotation_script")]
    pub annotation_script: PathBuf,

    /// Organism to Whippet index. Entries from the file are merged over
    /// the built-in ones.
    #[serde(default = "default_indexes", deserialize_with = "merge_indexes")]
    pub indexes: HashMap<String, PathBuf>,

    /// Event types to filter and annotate.
    #[serde(default = "default_events")]
    pub events: Vec<EventType>,
}

fn default_julia() -> String {
    "julia".to_string()
}

fn default_whippet_quant() -> PathBuf {
    PathBuf::from("/home/luco/soft/Whippet.jl-master/bin/whippet-quant.jl")
}

fn default_rscript() -> String {
    "Rscript".to_string()
}

fn default_annotation_script() -> PathBuf {
    PathBuf::from("/home/luco/code/R/annotSymbol.R")
}

fn default_indexes() -> HashMap<String, PathBuf> {
    HashMap::from([
        (
            "human".to_string(),
            PathBuf::from("/home/luco/index_whippet/human/human_index_whippet"),
        ),
        (
            "mouse".to_string(),
            PathBuf::from("/home/luco/index_whippet/mouse/mouse_index_whippet"),
        ),
    ])
}

fn default_events() -> Vec<EventType> {
    vec![EventType::CoreExon]
}

fn merge_indexes<'de, D>(deserializer: D) -> Result<HashMap<String, PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = HashMap::<String, PathBuf>::deserialize(deserializer)?;
    let mut indexes = default_indexes();
    indexes.extend(overrides);
    Ok(indexes)
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            julia: default_julia(),
            whippet_quant: default_whippet_quant(),
            rscript: default_rscript(),
            annotation_script: default_annotation_script(),
            indexes: default_indexes(),
            events: default_events(),
        }
    }
}
