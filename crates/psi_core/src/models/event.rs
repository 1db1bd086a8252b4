//! Whippet splicing event types.

use serde::{Deserialize, Serialize};

/// Splicing event class as reported in the `Type` column of a `.psi` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Core exon.
    #[serde(rename = "CE")]
    CoreExon,
    /// Alternative acceptor splice site.
    #[serde(rename = "AA")]
    AltAcceptor,
    /// Alternative donor splice site.
    #[serde(rename = "AD")]
    AltDonor,
    /// Retained intron.
    #[serde(rename = "RI")]
    RetainedIntron,
    /// Tandem transcription start site.
    #[serde(rename = "TS")]
    TandemStart,
    /// Tandem alternative polyadenylation site.
    #[serde(rename = "TE")]
    TandemEnd,
    /// Alternative first exon.
    #[serde(rename = "AF")]
    AltFirstExon,
    /// Alternative last exon.
    #[serde(rename = "AL")]
    AltLastExon,
    /// Circular back-splicing.
    #[serde(rename = "BS")]
    BackSplice,
}

impl EventType {
    /// Short code used on the cleaner command line and in file names.
    pub fn code(&self) -> &'static str {
        match self {
            EventType::CoreExon => "CE",
            EventType::AltAcceptor => "AA",
            EventType::AltDonor => "AD",
            EventType::RetainedIntron => "RI",
            EventType::TandemStart => "TS",
            EventType::TandemEnd => "TE",
            EventType::AltFirstExon => "AF",
            EventType::AltLastExon => "AL",
            EventType::BackSplice => "BS",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
