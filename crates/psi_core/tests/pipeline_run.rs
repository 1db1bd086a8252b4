//! End-to-end run of the standard pipeline against a temp output directory.
//!
//! The fake runner mimics the file effects of the real tools:
//! whippet-quant writes `<prefix>.psi.gz`, the cleaner writes
//! `<ID>.<EV>.psi`, and the annotation script writes `<file>.annotated`.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;
use parking_lot::Mutex;

use psi_core::command::{CommandOutput, CommandRunner, ToolCommand};
use psi_core::config::PipelineConfig;
use psi_core::orchestrator::RunDriver;

const PSI_TABLE: &str = "Gene\tNode\tCoord\tStrand\tType\tPsi\nENSG01\t3\tchr1:100-200\t+\tCE\t0.42\n";

#[derive(Default)]
struct FakeTools {
    calls: Mutex<Vec<String>>,
}

impl FakeTools {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl CommandRunner for FakeTools {
    fn run(&self, command: &ToolCommand) -> io::Result<CommandOutput> {
        self.calls.lock().push(command.to_string());
        let args: Vec<String> = command
            .get_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        match command.tool_name().as_str() {
            "julia" => {
                let prefix = args.last().expect("-o prefix");
                let mut encoder = GzEncoder::new(
                    File::create(format!("{}.psi.gz", prefix))?,
                    Compression::default(),
                );
                encoder.write_all(PSI_TABLE.as_bytes())?;
                encoder.finish()?;
                Ok(CommandOutput::succeeded("Whippet quant done"))
            }
            "cleaner" => {
                let (event, id, out) = (&args[0], &args[1], &args[2]);
                let source = Path::new(out).join(format!("{}.psi", id));
                let table = fs::read_to_string(&source)?;
                fs::write(Path::new(out).join(format!("{}.{}.psi", id, event)), table)?;
                Ok(CommandOutput::succeeded(""))
            }
            "Rscript" => {
                let file = args
                    .iter()
                    .find_map(|a| a.strip_prefix("--file="))
                    .expect("--file argument");
                fs::copy(file, format!("{}.annotated", file))?;
                Ok(CommandOutput::succeeded(""))
            }
            other => Ok(CommandOutput::failed(127, format!("{}: not found", other))),
        }
    }
}

fn write_config(dir: &Path, out: &Path) -> PathBuf {
    let config = format!(
        r#"{{
            "organism": "mouse",
            "path_to_input": "{input}/",
            "path_to_output": "{out}/",
            "path_to_cleaner": "/usr/local/bin/cleaner",
            "analysis": {{
                "KO_VS_WT": {{ "SAMPLE": "ko", "CONTROL": "wt" }}
            }},
            "files": {{
                "ko": [ {{ "KO1": {{ "R1": "ko1_R1.fq.gz", "R2": "ko1_R2.fq.gz" }} }} ],
                "wt": [ {{ "WT1": {{ "R1": "wt1.fq.gz", "R2": "None" }} }} ]
            }},
            "tools": {{ "indexes": {{ "mouse": "/idx/mouse" }} }}
        }}"#,
        input = dir.join("fastq").display(),
        out = out.display(),
    );
    let path = dir.join("KO_STUDY.json");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn full_run_produces_annotated_tables_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("whippet");
    let config_path = write_config(dir.path(), &out);
    let config = PipelineConfig::load(&config_path).unwrap();
    let tools = Arc::new(FakeTools::default());

    let report = RunDriver::new(config, &config_path)
        .runner(tools.clone())
        .run()
        .unwrap();

    assert_eq!(report.state.run_id, "KO_STUDY");
    assert_eq!(report.state.failed_commands(), 0);

    // Both roles quantified, only SAMPLE post-processed.
    assert!(out.join("KO1.psi.gz").exists());
    assert!(out.join("WT1.psi.gz").exists());
    assert_eq!(
        fs::read_to_string(out.join("KO1.CE.psi.annotated")).unwrap(),
        PSI_TABLE
    );
    assert!(!out.join("WT1.CE.psi.annotated").exists());

    // Intermediates removed.
    assert!(!out.join("KO1.psi").exists());
    assert!(!out.join("KO1.CE.psi").exists());

    let calls = tools.calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[0].starts_with("julia "));
    assert!(calls[0].contains("-x /idx/mouse"));
    assert!(calls[2].starts_with("/usr/local/bin/cleaner CE KO1"));
    assert!(calls[3].contains("--organism=mouse"));

    let log = fs::read_to_string(out.join("activity.log")).unwrap();
    assert!(log.contains("=== Run whippet-quant ==="));
    assert!(log.contains("=== Gunzip, filter, annotate ==="));
    assert!(log.contains("Whippet quant done"));
}

#[test]
fn second_run_skips_quantification() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("whippet");
    let config_path = write_config(dir.path(), &out);

    let first = Arc::new(FakeTools::default());
    RunDriver::new(PipelineConfig::load(&config_path).unwrap(), &config_path)
        .runner(first.clone())
        .run()
        .unwrap();

    let second = Arc::new(FakeTools::default());
    let report = RunDriver::new(PipelineConfig::load(&config_path).unwrap(), &config_path)
        .runner(second.clone())
        .run()
        .unwrap();

    let quantify = report.state.quantify.unwrap();
    assert_eq!(quantify.commands_run, 0);
    assert_eq!(quantify.samples_skipped, 2);
    assert!(second.calls().iter().all(|c| !c.starts_with("julia")));

    // Both runs append to the same activity log.
    let log = fs::read_to_string(out.join("activity.log")).unwrap();
    assert_eq!(log.matches("=========> START:").count(), 2);
}

#[test]
fn failing_tool_does_not_abort_run() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("whippet");
    let config_path = write_config(dir.path(), &out);
    let mut config = PipelineConfig::load(&config_path).unwrap();
    config.path_to_cleaner = PathBuf::from("/missing/filter-tool");
    let tools = Arc::new(FakeTools::default());

    let report = RunDriver::new(config, &config_path)
        .runner(tools.clone())
        .run()
        .unwrap();

    assert_eq!(report.result.steps_completed, vec!["Quantify", "PostProcess"]);
    // filter fails (unknown tool), then annotation fails on the missing table
    assert_eq!(report.state.failed_commands(), 2);

    let log = fs::read_to_string(out.join("activity.log")).unwrap();
    assert!(log.contains("filter-tool failed with exit code 127"));
}
