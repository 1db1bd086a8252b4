//! PostProcess step - decompress, filter per event type, annotate, clean up.
//!
//! Only the `SAMPLE` group of each analysis is post-processed. Per sample:
//!
//! ```text
//! ID.psi.gz --gunzip--> ID.psi --cleaner EV--> ID.EV.psi --Rscript--> annotated
//! ```
//!
//! `ID.EV.psi` is removed after each event, `ID.psi` once the last event
//! that ran is done. An existing `ID.psi` skips decompression; an existing
//! `ID.EV.psi` skips that event, and a sample whose events were all skipped
//! keeps its `ID.psi`.

use std::io;
use std::path::Path;

use crate::command::{run_logged, ToolCommand};
use crate::config::PipelineConfig;
use crate::decompress::gunzip_keep;
use crate::models::{EventType, SampleOutputs};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, PostProcessOutput, RunState, StepOutcome};

/// Post-processing step for quantified samples.
pub struct PostProcessStep;

impl PostProcessStep {
    pub fn new() -> Self {
        Self
    }

    /// `<cleaner> <EV> <ID> <OUT>`
    pub fn filter_command(
        config: &PipelineConfig,
        event: EventType,
        outputs: &SampleOutputs,
    ) -> ToolCommand {
        ToolCommand::new(&config.path_to_cleaner)
            .arg(event.code())
            .arg(outputs.sample_id())
            .arg(&config.path_to_output)
    }

    /// `<Rscript> <annotSymbol.R> --organism=<org> --file=<OUT/ID.EV.psi>`
    pub fn annotate_command(
        config: &PipelineConfig,
        event: EventType,
        outputs: &SampleOutputs,
    ) -> ToolCommand {
        let mut file_arg = std::ffi::OsString::from("--file=");
        file_arg.push(outputs.event_psi(event));

        ToolCommand::new(&config.tools.rscript)
            .arg(&config.tools.annotation_script)
            .arg(format!("--organism={}", config.organism))
            .arg(file_arg)
    }

    fn decompress(&self, ctx: &Context, outputs: &SampleOutputs, out: &mut PostProcessOutput) {
        let psi = outputs.psi();
        if psi.is_file() {
            ctx.logger.info(&format!(
                "No need to process again. {} already exists",
                psi.display()
            ));
            return;
        }

        let archive = outputs.psi_gz();
        ctx.logger
            .command(&format!("gunzip -k {}", archive.display()));
        if ctx.dry_run {
            return;
        }

        match gunzip_keep(&archive, &psi) {
            Ok(bytes) => {
                ctx.logger
                    .debug(&format!("Wrote {} ({} bytes)", psi.display(), bytes));
                out.decompressed += 1;
            }
            Err(e) => {
                ctx.logger.error(&format!(
                    "Failed to decompress {}: {}",
                    archive.display(),
                    e
                ));
                out.decompress_failed += 1;
            }
        }
    }

    /// Filter and annotate one event. Returns false if the event was skipped.
    fn process_event(
        &self,
        ctx: &Context,
        outputs: &SampleOutputs,
        event: EventType,
        out: &mut PostProcessOutput,
    ) -> bool {
        let filtered = outputs.event_psi(event);
        if filtered.is_file() {
            ctx.logger.info(&format!(
                "No need to process again. {} already exists",
                filtered.display()
            ));
            out.events_skipped += 1;
            return false;
        }

        ctx.logger.info(&format!("Event {}: filter", event));
        let filter = Self::filter_command(&ctx.config, event, outputs);
        out.commands_run += 1;
        if !run_logged(ctx.runner(), &filter, &ctx.logger) {
            out.commands_failed += 1;
        }

        ctx.logger.info(&format!("Event {}: annotate", event));
        let annotate = Self::annotate_command(&ctx.config, event, outputs);
        out.commands_run += 1;
        if !run_logged(ctx.runner(), &annotate, &ctx.logger) {
            out.commands_failed += 1;
        }

        if self.remove_intermediate(ctx, &filtered) {
            out.intermediates_removed += 1;
        }
        true
    }

    /// Delete an intermediate file. A file that is already gone is fine.
    fn remove_intermediate(&self, ctx: &Context, path: &Path) -> bool {
        ctx.logger.command(&format!("rm {}", path.display()));
        if ctx.dry_run {
            return false;
        }

        match std::fs::remove_file(path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                ctx.logger
                    .debug(&format!("{} was not created, nothing to remove", path.display()));
                false
            }
            Err(e) => {
                ctx.logger
                    .warn(&format!("Failed to remove {}: {}", path.display(), e));
                false
            }
        }
    }
}

impl Default for PostProcessStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PostProcessStep {
    fn name(&self) -> &str {
        "PostProcess"
    }

    fn description(&self) -> &str {
        "Gunzip, filter, annotate"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        ctx.check_output_dir()?;
        if ctx.config.tools.events.is_empty() {
            return Err(StepError::invalid_input("No event types configured"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let config = &ctx.config;
        if config.analysis.is_empty() {
            state.post_process = Some(PostProcessOutput::default());
            return Ok(StepOutcome::Skipped("No analyses configured".to_string()));
        }

        let mut out = PostProcessOutput::default();

        for (analysis_name, analysis) in config.analysis.iter() {
            let group = config
                .post_process_group(analysis)
                .ok_or_else(|| StepError::MissingSampleRole(analysis_name.to_string()))?;
            let samples = config
                .samples_in_group(group)
                .ok_or_else(|| StepError::unknown_sample_group(analysis_name, group))?;

            ctx.logger
                .section(&format!("{}: {}", analysis_name, group));

            for sample in samples {
                let outputs = ctx.outputs(&sample.id);
                ctx.logger.info(&format!("Sample {}", sample.id));

                self.decompress(ctx, &outputs, &mut out);

                let mut any_ran = false;
                for &event in &config.tools.events {
                    any_ran |= self.process_event(ctx, &outputs, event, &mut out);
                }

                // Every filter run reads ID.psi, so it goes after the last event.
                if any_ran && self.remove_intermediate(ctx, &outputs.psi()) {
                    out.intermediates_removed += 1;
                }
            }
        }

        state.post_process = Some(out);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.post_process.is_none() {
            return Err(StepError::invalid_output("Post-processing not recorded"));
        }
        Ok(())
    }
}
