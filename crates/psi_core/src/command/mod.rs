//! External tool execution.
//!
//! Tools are run to completion with stdout and stderr captured. A tool that
//! exits non-zero is not an error at this level: the outcome is logged and
//! the caller moves on to the next sample.
//!
//! # Example
//!
//! ```no_run
//! use psi_core::command::{CommandRunner, SystemRunner, ToolCommand};
//!
//! let cmd = ToolCommand::new("julia").arg("whippet-quant.jl").arg("--help");
//! let output = SystemRunner.run(&cmd).unwrap();
//! println!("exit code: {:?}", output.exit_code);
//! ```

mod runner;

pub use runner::{run_logged, CommandOutput, CommandRunner, DryRunRunner, SystemRunner};

use std::ffi::{OsStr, OsString};
use std::fmt;

/// A program invocation: the program and its arguments, no shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Program file name, used to label outcomes in the log.
    pub fn tool_name(&self) -> String {
        std::path::Path::new(&self.program)
            .file_name()
            .unwrap_or(&self.program)
            .to_string_lossy()
            .into_owned()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn displays_as_command_line() {
        let cmd = ToolCommand::new("julia")
            .arg("whippet-quant.jl")
            .args(["-x", "index"])
            .arg(Path::new("/out/S1"));
        assert_eq!(cmd.to_string(), "julia whippet-quant.jl -x index /out/S1");
        assert_eq!(cmd.get_args().len(), 4);
    }

    #[test]
    fn tool_name_strips_directories() {
        assert_eq!(ToolCommand::new("/opt/bin/cleaner").tool_name(), "cleaner");
        assert_eq!(ToolCommand::new("Rscript").tool_name(), "Rscript");
    }
}
