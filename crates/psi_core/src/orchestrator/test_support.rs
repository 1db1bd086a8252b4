//! Shared fixtures for orchestrator tests.

use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use super::types::Context;
use crate::command::{CommandOutput, CommandRunner, ToolCommand};
use crate::config::PipelineConfig;
use crate::logging::{ActivityLogger, LogConfig};

/// Config with one analysis: `ko` is post-processed, `wt` only quantified.
/// `{out}` is replaced by the output directory.
pub const MINIMAL_CONFIG: &str = r#"{
    "organism": "human",
    "path_to_input": "/in",
    "path_to_output": "{out}",
    "path_to_cleaner": "/bin/cleaner",
    "analysis": {
        "KO_VS_WT": { "SAMPLE": "ko", "CONTROL": "wt" }
    },
    "files": {
        "ko": [
            { "KO1": { "R1": "ko1_R1.fq.gz", "R2": "ko1_R2.fq.gz" } },
            { "KO2": { "R1": "ko2.fq.gz", "R2": "None" } }
        ],
        "wt": [ { "WT1": { "R1": "wt1.fq.gz", "R2": "None" } } ]
    },
    "tools": {
        "whippet_quant": "/opt/whippet-quant.jl",
        "annotation_script": "/opt/annotSymbol.R",
        "indexes": { "human": "/idx/human" }
    }
}"#;

type Handler = Box<dyn Fn(&ToolCommand) -> io::Result<CommandOutput> + Send + Sync>;

/// Runner that records every command line and answers with a handler.
pub struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    handler: Handler,
}

impl RecordingRunner {
    /// Every command succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::with_handler(|_| Ok(CommandOutput::succeeded("")))
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&ToolCommand) -> io::Result<CommandOutput> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// Command lines run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &ToolCommand) -> io::Result<CommandOutput> {
        self.calls.lock().push(command.to_string());
        (self.handler)(command)
    }
}

/// Build a context whose output directory is `out`.
pub fn test_context(out: &Path, config_json: &str) -> (Context, Arc<RecordingRunner>) {
    test_context_with(out, config_json, RecordingRunner::succeeding())
}

/// Build a context with a custom runner.
pub fn test_context_with(
    out: &Path,
    config_json: &str,
    runner: RecordingRunner,
) -> (Context, Arc<RecordingRunner>) {
    crate::logging::init_test_tracing();

    let json = config_json.replace("{out}", &out.display().to_string());
    let config = PipelineConfig::from_json_str(&json).expect("test config is valid");
    let logger = ActivityLogger::new(out, LogConfig::debug()).expect("activity log opens");

    let runner = Arc::new(runner);
    let ctx = Context::new(config, "test_run", Arc::new(logger), runner.clone());
    (ctx, runner)
}
