//! Samples, read pairs and per-sample output paths.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use super::EventType;

/// Read files of one sample, relative to the input directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadPair {
    /// First (or only) read file.
    #[serde(rename = "R1")]
    pub r1: String,

    /// Mate file for paired-end samples.
    ///
    /// Absent, `null` and the string `"None"` all mean single-end.
    #[serde(rename = "R2", default, deserialize_with = "deserialize_mate")]
    pub r2: Option<String>,
}

impl ReadPair {
    /// Paired-end read pair.
    pub fn paired(r1: impl Into<String>, r2: impl Into<String>) -> Self {
        Self {
            r1: r1.into(),
            r2: Some(r2.into()),
        }
    }

    /// Whether the sample has a mate file.
    pub fn is_paired(&self) -> bool {
        self.r2.is_some()
    }

    /// Read files resolved against the input directory, R1 first.
    pub fn resolve(&self, input_dir: &Path) -> Vec<PathBuf> {
        std::iter::once(&self.r1)
            .chain(self.r2.iter())
            .map(|name| input_dir.join(name))
            .collect()
    }
}

fn deserialize_mate<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty() && s != "None"))
}

/// A sample identifier together with its reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub id: String,
    pub reads: ReadPair,
}

/// Output file layout for one sample in the output directory.
#[derive(Debug, Clone)]
pub struct SampleOutputs {
    dir: PathBuf,
    id: String,
}

impl SampleOutputs {
    pub fn new(output_dir: impl Into<PathBuf>, sample_id: impl Into<String>) -> Self {
        Self {
            dir: output_dir.into(),
            id: sample_id.into(),
        }
    }

    pub fn sample_id(&self) -> &str {
        &self.id
    }

    /// Output prefix handed to whippet-quant (`-o`).
    pub fn prefix(&self) -> PathBuf {
        self.dir.join(&self.id)
    }

    /// Compressed quantification written by whippet-quant.
    pub fn psi_gz(&self) -> PathBuf {
        self.dir.join(format!("{}.psi.gz", self.id))
    }

    /// Decompressed quantification.
    pub fn psi(&self) -> PathBuf {
        self.dir.join(format!("{}.psi", self.id))
    }

    /// Table filtered to one event type.
    pub fn event_psi(&self, event: EventType) -> PathBuf {
        self.dir.join(format!("{}.{}.psi", self.id, event.code()))
    }

    /// True if quantification already ran for this sample.
    pub fn is_quantified(&self) -> bool {
        self.psi_gz().is_file() || self.psi().is_file()
    }
}
