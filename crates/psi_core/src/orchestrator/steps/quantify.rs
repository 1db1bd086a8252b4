//! Quantify step - runs whippet-quant for every sample of every analysis.
//!
//! Every role of every analysis is quantified, not only `SAMPLE`. A sample
//! whose `.psi.gz` or `.psi` is already in the output directory is skipped,
//! which also means a sample shared between analyses runs once.

use std::path::Path;

use crate::command::{run_logged, ToolCommand};
use crate::config::ToolSettings;
use crate::models::{ReadPair, SampleOutputs};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, QuantifyOutput, RunState, StepOutcome};

/// Quantify step for running Whippet over the read files.
pub struct QuantifyStep;

impl QuantifyStep {
    pub fn new() -> Self {
        Self
    }

    /// Build the whippet-quant command line for one sample.
    ///
    /// `julia <whippet-quant.jl> -x <index> <R1> [<R2>] -o <out/ID>`
    pub fn build_command(
        tools: &ToolSettings,
        index: &Path,
        input_dir: &Path,
        reads: &ReadPair,
        outputs: &SampleOutputs,
    ) -> ToolCommand {
        ToolCommand::new(&tools.julia)
            .arg(&tools.whippet_quant)
            .arg("-x")
            .arg(index)
            .args(reads.resolve(input_dir))
            .arg("-o")
            .arg(outputs.prefix())
    }
}

impl Default for QuantifyStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for QuantifyStep {
    fn name(&self) -> &str {
        "Quantify"
    }

    fn description(&self) -> &str {
        "Run whippet-quant"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        ctx.check_output_dir()?;
        if ctx.config.index_path().is_none() {
            return Err(StepError::invalid_input(format!(
                "No Whippet index for organism '{}'",
                ctx.config.organism
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let config = &ctx.config;
        if config.analysis.is_empty() {
            state.quantify = Some(QuantifyOutput::default());
            return Ok(StepOutcome::Skipped("No analyses configured".to_string()));
        }

        let index = config
            .index_path()
            .ok_or_else(|| StepError::invalid_input("Whippet index not configured"))?;
        let mut output = QuantifyOutput::default();

        for (analysis_name, analysis) in config.analysis.iter() {
            for (role, group) in analysis.iter() {
                let samples = config
                    .samples_in_group(group)
                    .ok_or_else(|| StepError::unknown_sample_group(analysis_name, group))?;

                ctx.logger
                    .section(&format!("{} / {}: {}", analysis_name, role, group));

                for sample in samples {
                    let outputs = ctx.outputs(&sample.id);
                    if outputs.is_quantified() {
                        ctx.logger.info(&format!(
                            "No need to process again. {} already exists",
                            outputs.psi_gz().display()
                        ));
                        output.samples_skipped += 1;
                        continue;
                    }

                    ctx.logger.info(&format!(
                        "Sample {} ({})",
                        sample.id,
                        if sample.reads.is_paired() {
                            "paired-end"
                        } else {
                            "single-end"
                        }
                    ));

                    let command = Self::build_command(
                        &config.tools,
                        index,
                        &config.path_to_input,
                        &sample.reads,
                        &outputs,
                    );

                    output.commands_run += 1;
                    if run_logged(ctx.runner(), &command, &ctx.logger) {
                        output.quantified.push(sample.id.clone());
                    } else {
                        output.commands_failed += 1;
                    }
                }
            }
        }

        state.quantify = Some(output);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.quantify.is_none() {
            return Err(StepError::invalid_output("Quantification not recorded"));
        }
        Ok(())
    }
}
