//! Logging types and configuration.

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Trace-level debugging (very verbose).
    Trace,
    /// Debug information.
    Debug,
    /// General information.
    #[default]
    Info,
    /// Warnings.
    Warn,
    /// Errors.
    Error,
}

impl LogLevel {
    /// Upper-case name as written in the activity log.
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Configuration for the activity log.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to output.
    pub level: LogLevel,
    /// Show timestamps in log output.
    pub show_timestamps: bool,
    /// Rotate the log file once it would grow past this many bytes.
    /// Zero disables rotation.
    pub max_bytes: u64,
    /// Number of rotated files to keep (`activity.log.1`, ...).
    pub backups: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            show_timestamps: true,
            max_bytes: 1_000_000,
            backups: 1,
        }
    }
}

impl LogConfig {
    /// Create a debug configuration.
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
            ..Self::default()
        }
    }
}

/// Message prefix types for consistent formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// Shell command: `$ command`
    Command,
    /// Phase marker: `=== Phase ===`
    Phase,
    /// Section marker: `--- Section ---`
    Section,
    /// Success: `[SUCCESS]`
    Success,
    /// Warning: `[WARNING]`
    Warning,
    /// Error: `[ERROR]`
    Error,
}

impl MessagePrefix {
    /// Format a message with this prefix.
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Command => format!("$ {}", message),
            MessagePrefix::Phase => format!("=== {} ===", message),
            MessagePrefix::Section => format!("--- {} ---", message),
            MessagePrefix::Success => format!("[SUCCESS] {}", message),
            MessagePrefix::Warning => format!("[WARNING] {}", message),
            MessagePrefix::Error => format!("[ERROR] {}", message),
        }
    }
}
