//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use super::errors::StepResult;
use super::types::{Context, RunState, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step recorded its results
///
/// # Example
///
/// ```ignore
/// struct QuantifyStep;
///
/// impl PipelineStep for QuantifyStep {
///     fn name(&self) -> &str { "Quantify" }
///
///     fn validate_input(&self, ctx: &Context) -> StepResult<()> {
///         ctx.check_output_dir()
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
///         // Run whippet-quant per sample...
///         state.quantify = Some(QuantifyOutput::default());
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
///         if state.quantify.is_none() {
///             return Err(StepError::invalid_output("Quantification not recorded"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    fn validate_input(&self, ctx: &Context) -> StepResult<()>;

    /// Execute the step's main work and record results in `state`.
    ///
    /// Tool failures are logged and counted, not returned. An `Err` here
    /// aborts the whole run.
    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome>;

    /// Validate outputs after execution.
    ///
    /// Called after `execute` returns `Success`.
    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
