//! Command runners and outcome logging.

use std::io;
use std::process::Command;

use super::ToolCommand;
use crate::logging::ActivityLogger;

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Whether the process exited successfully.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs external tools.
///
/// `Err` means the process could not be started at all. A process that ran
/// and failed comes back as `Ok` with `success == false`.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &ToolCommand) -> io::Result<CommandOutput>;
}

/// Runs commands with `std::process::Command`, blocking until exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> io::Result<CommandOutput> {
        tracing::debug!("Running: {}", command);

        let output = Command::new(command.program())
            .args(command.get_args())
            .output()?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs nothing and reports success. Used for `--dry-run`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, command: &ToolCommand) -> io::Result<CommandOutput> {
        tracing::debug!("Dry run, not executing: {}", command);
        Ok(CommandOutput::succeeded(""))
    }
}

/// Log a command line, run it and log the outcome.
///
/// Returns whether the command succeeded. Failures are logged with the exit
/// code and captured stderr and are never propagated.
pub fn run_logged(
    runner: &dyn CommandRunner,
    command: &ToolCommand,
    logger: &ActivityLogger,
) -> bool {
    logger.command(&command.to_string());

    match runner.run(command) {
        Ok(output) if output.success => {
            let stdout = output.stdout.trim_end();
            if !stdout.is_empty() {
                logger.info(stdout);
            }
            true
        }
        Ok(output) => {
            let code = output
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none (terminated by signal)".to_string());
            logger.error(&format!(
                "{} failed with exit code {}",
                command.tool_name(),
                code
            ));
            let stderr = output.stderr.trim_end();
            if !stderr.is_empty() {
                logger.error(&format!("Standard error:\n{}", stderr));
            }
            false
        }
        Err(e) => {
            logger.error(&format!("Failed to run {}: {}", command.tool_name(), e));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use std::fs;
    use tempfile::tempdir;

    struct FixedRunner(io::Result<CommandOutput>);

    impl CommandRunner for FixedRunner {
        fn run(&self, _command: &ToolCommand) -> io::Result<CommandOutput> {
            match &self.0 {
                Ok(output) => Ok(output.clone()),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            }
        }
    }

    fn logged(runner: FixedRunner) -> (bool, String) {
        let dir = tempdir().unwrap();
        let logger = ActivityLogger::new(dir.path(), LogConfig::default()).unwrap();
        let cmd = ToolCommand::new("/opt/bin/cleaner").args(["CE", "S1", "/out"]);

        let ok = run_logged(&runner, &cmd, &logger);
        logger.flush();
        (ok, fs::read_to_string(logger.log_path()).unwrap())
    }

    #[test]
    fn success_logs_command_and_stdout() {
        let (ok, log) = logged(FixedRunner(Ok(CommandOutput::succeeded("kept 120 events\n"))));
        assert!(ok);
        assert!(log.contains("$ /opt/bin/cleaner CE S1 /out"));
        assert!(log.contains("kept 120 events"));
    }

    #[test]
    fn failure_logs_exit_code_and_stderr() {
        let (ok, log) = logged(FixedRunner(Ok(CommandOutput::failed(3, "no such file"))));
        assert!(!ok);
        assert!(log.contains("cleaner failed with exit code 3"));
        assert!(log.contains("no such file"));
    }

    #[test]
    fn spawn_error_is_logged() {
        let (ok, log) = logged(FixedRunner(Err(io::Error::new(
            io::ErrorKind::NotFound,
            "not found",
        ))));
        assert!(!ok);
        assert!(log.contains("Failed to run cleaner"));
    }

    #[test]
    fn dry_run_succeeds_without_output() {
        let output = DryRunRunner.run(&ToolCommand::new("julia")).unwrap();
        assert!(output.success);
        assert!(output.stdout.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_output() {
        let output = SystemRunner
            .run(&ToolCommand::new("sh").args(["-c", "echo out; echo err >&2; exit 4"]))
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(4));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[test]
    fn system_runner_reports_missing_program() {
        let result = SystemRunner.run(&ToolCommand::new("definitely-not-a-real-tool-xyz"));
        assert!(result.is_err());
    }
}
