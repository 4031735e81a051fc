//! Severity levels and threshold comparison
//!
//! Every level has a numeric rank. A message passes a threshold when its rank
//! is less than or equal to the threshold's rank, so a threshold of `INFO`
//! lets `ERROR`, `WARN`, `INFO` and `SUCCESS` through. `INFO` and `SUCCESS`
//! share rank 3.

use std::fmt;
use std::str::FromStr;

use colored::Color;
use serde::{Deserialize, Serialize};

use crate::core::LogError;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Nothing passes a SILENT threshold except SILENT itself
    Silent,
    /// Error level
    Error,
    /// Warning level
    #[serde(alias = "WARNING")]
    Warn,
    /// Info level
    Info,
    /// Success level, same rank as [`Level::Info`]
    Success,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
    /// Verbose level
    Verbose,
}

impl Level {
    /// All levels in rank order
    pub const ALL: [Level; 8] = [
        Level::Silent,
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Success,
        Level::Debug,
        Level::Trace,
        Level::Verbose,
    ];

    /// Numeric severity rank
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            Level::Silent => 0,
            Level::Error => 1,
            Level::Warn => 2,
            Level::Info | Level::Success => 3,
            Level::Debug => 4,
            Level::Trace => 5,
            Level::Verbose => 6,
        }
    }

    /// Whether a message at this level passes `threshold`
    #[inline]
    pub const fn passes(self, threshold: Level) -> bool {
        self.rank() <= threshold.rank()
    }

    /// Upper-case name
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Silent => "SILENT",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
            Level::Verbose => "VERBOSE",
        }
    }

    /// Console color for this level
    pub const fn color(self) -> Color {
        match self {
            Level::Error => Color::Red,
            Level::Warn => Color::Yellow,
            Level::Success => Color::Green,
            Level::Info => Color::BrightCyan,
            Level::Debug => Color::White,
            Level::Trace => Color::Magenta,
            Level::Verbose => Color::Cyan,
            Level::Silent => Color::BrightWhite,
        }
    }

    /// Levels whose entries carry a call stack when capture is enabled
    pub const fn captures_call_stack(self) -> bool {
        matches!(self, Level::Error | Level::Debug | Level::Trace)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` so width specifiers like `{:<7}` work
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SILENT" => Ok(Level::Silent),
            "ERROR" => Ok(Level::Error),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "INFO" => Ok(Level::Info),
            "SUCCESS" => Ok(Level::Success),
            "DEBUG" => Ok(Level::Debug),
            "TRACE" => Ok(Level::Trace),
            "VERBOSE" => Ok(Level::Verbose),
            _ => Err(LogError::InvalidLevel(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::TRACE => Level::Trace,
        }
    }
}
