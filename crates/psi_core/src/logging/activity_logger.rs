//! Activity logger writing to `activity.log` in the output directory.
//!
//! Each message goes to:
//! - the activity log file (appended, size-rotated)
//! - a `tracing` event, which the global subscriber prints to stderr

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogConfig, LogLevel, MessagePrefix};

/// File name of the activity log inside the output directory.
pub const ACTIVITY_LOG_NAME: &str = "activity.log";

/// Logger for one pipeline run.
pub struct ActivityLogger {
    /// Path to log file.
    log_path: PathBuf,
    /// Rotating file writer.
    file: Mutex<Option<RotatingFile>>,
    /// Logging configuration.
    config: LogConfig,
}

impl ActivityLogger {
    /// Open (or create) `activity.log` in `log_dir` for appending.
    pub fn new(log_dir: impl AsRef<Path>, config: LogConfig) -> io::Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(ACTIVITY_LOG_NAME);
        let file = RotatingFile::open(&log_path, config.max_bytes, config.backups)?;

        Ok(Self {
            log_path,
            file: Mutex::new(Some(file)),
            config,
        })
    }

    /// Get the log file path.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        emit_tracing(level, message);

        let line = self.format_line(level, message);
        if let Some(ref mut file) = *self.file.lock() {
            if let Err(e) = file.write_line(&line) {
                tracing::warn!("Failed to write activity log: {}", e);
            }
        }
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a command being executed.
    pub fn command(&self, command: &str) {
        let msg = MessagePrefix::Command.format(command);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a section marker.
    pub fn section(&self, section_name: &str) {
        let msg = MessagePrefix::Section.format(section_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut file) = *self.file.lock() {
            let _ = file.flush();
        }
    }

    /// Close the logger and release the file.
    pub fn close(&self) {
        self.flush();
        *self.file.lock() = None;
    }

    fn format_line(&self, level: LogLevel, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
            format!("{} :: {} :: {}", timestamp, level.label(), message)
        } else {
            format!("{} :: {}", level.label(), message)
        }
    }
}

impl Drop for ActivityLogger {
    fn drop(&mut self) {
        self.close();
    }
}

fn emit_tracing(level: LogLevel, message: &str) {
    match level {
        LogLevel::Trace => tracing::trace!(target: "activity", "{}", message),
        LogLevel::Debug => tracing::debug!(target: "activity", "{}", message),
        LogLevel::Info => tracing::info!(target: "activity", "{}", message),
        LogLevel::Warn => tracing::warn!(target: "activity", "{}", message),
        LogLevel::Error => tracing::error!(target: "activity", "{}", message),
    }
}

/// Append-mode file that rolls over to numbered backups by size.
struct RotatingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    backups: usize,
}

impl RotatingFile {
    fn open(path: &Path, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            file,
            written,
            max_bytes,
            backups,
        })
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let len = line.len() as u64 + 1;
        if self.max_bytes > 0 && self.written > 0 && self.written + len > self.max_bytes {
            self.rotate()?;
        }
        writeln!(self.file, "{}", line)?;
        self.written += len;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    /// Shift `log.N-1` to `log.N`, ..., `log` to `log.1` and start a new file.
    /// With zero backups the current file is truncated instead.
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups > 0 {
            for n in (1..self.backups).rev() {
                let from = backup_path(&self.path, n);
                if from.exists() {
                    fs::rename(&from, backup_path(&self.path, n + 1))?;
                }
            }
            fs::rename(&self.path, backup_path(&self.path, 1))?;
        } else {
            fs::remove_file(&self.path)?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

fn backup_path(path: &Path, n: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", n));
    PathBuf::from(name)
}
