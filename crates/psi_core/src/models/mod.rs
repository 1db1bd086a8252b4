//! Data models for the PSI pipeline.
//!
//! - Splicing event types handled by the post-processing phase
//! - Samples, read pairs and the output file layout of a sample

mod event;
mod sample;

pub use event::EventType;
pub use sample::{ReadPair, Sample, SampleOutputs};
