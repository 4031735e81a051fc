//! Core configuration types

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::LogError;
use crate::level::Level;
use crate::rotation::RotationPolicy;

/// Logging configuration
///
/// Independent toggles map one-to-one onto environment variables, hence the
/// plain booleans.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfiguration {
    /// File threshold
    pub level: Level,
    /// Console threshold
    pub console_level: Level,
    /// Active log file
    pub log_file_path: PathBuf,
    /// Rotate once the active file grows past this many MiB
    pub max_log_size_mb: u64,
    /// Number of numbered archives kept next to the active file
    pub max_log_files: usize,
    /// Emit entries written through [`crate::LabLogger::trace`]
    pub enable_trace: bool,
    /// Record performance traces
    pub enable_performance: bool,
    /// Capture call stacks for ERROR, DEBUG and TRACE entries
    pub enable_call_stack: bool,
    /// Write to the log file
    pub log_to_file: bool,
    /// Write to the console
    pub log_to_console: bool,
    /// Colorize console lines when the terminal supports it
    pub console_colors: bool,
    /// File encoding
    pub format: Format,
    /// Set once [`crate::LabLogger::initialize`] has run
    pub initialized: bool,
}

/// File line encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// Bracketed metadata fields followed by message and context
    #[default]
    Structured,
    /// `[timestamp] [LEVEL] message`
    Simple,
    /// One compact JSON object per line
    #[serde(rename = "JSON", alias = "Json")]
    Json,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            level: Level::Info,
            console_level: Level::Info,
            log_file_path: default_log_path(),
            max_log_size_mb: 50,
            max_log_files: 10,
            enable_trace: false,
            enable_performance: false,
            enable_call_stack: true,
            log_to_file: true,
            log_to_console: true,
            console_colors: true,
            format: Format::Structured,
            initialized: false,
        }
    }
}

impl LogConfiguration {
    /// Size threshold in bytes
    #[inline]
    pub fn max_log_size_bytes(&self) -> u64 {
        self.max_log_size_mb.saturating_mul(1024 * 1024)
    }

    /// Rotation policy derived from the size and retention settings
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new(self.max_log_size_bytes(), self.max_log_files)
    }

    /// Whether a message at `level` reaches the console
    #[inline]
    pub fn console_accepts(&self, level: Level) -> bool {
        self.log_to_console && level.passes(self.console_level)
    }

    /// Whether a message at `level` reaches the file
    #[inline]
    pub fn file_accepts(&self, level: Level) -> bool {
        self.log_to_file && level.passes(self.level)
    }
}

fn default_log_path() -> PathBuf {
    std::env::temp_dir()
        .join("lab-automation")
        .join("logs")
        .join("lab-automation.log")
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Structured => write!(f, "Structured"),
            Format::Simple => write!(f, "Simple"),
            Format::Json => write!(f, "JSON"),
        }
    }
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(Format::Structured),
            "simple" => Ok(Format::Simple),
            "json" => Ok(Format::Json),
            _ => Err(LogError::InvalidFormat(s.to_string())),
        }
    }
}
