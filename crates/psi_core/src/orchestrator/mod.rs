//! Pipeline orchestrator for coordinating a run.
//!
//! A run is a sequence of steps that validate, execute, and record their
//! results. Steps are strictly sequential and every external tool blocks
//! until it exits.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Quantify     (whippet-quant per sample)
//!     └── Step: PostProcess  (gunzip, filter, annotate, clean up)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use psi_core::orchestrator::{create_standard_pipeline, Context, RunState};
//!
//! let pipeline = create_standard_pipeline();
//! let ctx = Context::new(config, "breast_cancer", logger, Arc::new(SystemRunner));
//! let mut state = RunState::new("breast_cancer");
//!
//! let result = pipeline.run(&ctx, &mut state)?;
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod driver;
mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use driver::{RunDriver, RunReport};
pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{PostProcessStep, QuantifyStep};
pub use types::{Context, PostProcessOutput, QuantifyOutput, RunState, StepOutcome};

/// Create a standard pipeline with all steps in the correct order.
///
/// 1. Quantify - run whippet-quant over every sample's reads
/// 2. PostProcess - decompress, filter per event type, annotate
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(QuantifyStep::new())
        .with_step(PostProcessStep::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pipeline_order() {
        let pipeline = create_standard_pipeline();
        assert_eq!(pipeline.step_names(), vec!["Quantify", "PostProcess"]);
    }
}
