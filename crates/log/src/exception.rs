//! Error details attached to log entries

use std::backtrace::BacktraceStatus;
use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

/// Error details attached to a log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    /// Short type name of the error
    #[serde(rename = "type")]
    pub type_name: String,
    /// `Display` output of the error
    pub message: String,
    /// Captured backtrace, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    /// Message of the first error in the `source()` chain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_message: Option<String>,
}

impl ExceptionInfo {
    /// Build from any error, using its static type for the type name
    pub fn from_error<E>(error: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        Self {
            type_name: short_type_name(std::any::type_name::<E>()),
            message: error.to_string(),
            stack_trace: None,
            inner_message: error.source().map(ToString::to_string),
        }
    }

    /// Build from an [`anyhow::Error`], keeping its backtrace if one was captured
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        let backtrace = error.backtrace();
        let stack_trace = (backtrace.status() == BacktraceStatus::Captured)
            .then(|| backtrace.to_string());

        Self {
            type_name: "anyhow::Error".to_string(),
            message: error.to_string(),
            stack_trace,
            inner_message: error.chain().nth(1).map(ToString::to_string),
        }
    }

    /// Attach a stack trace
    #[must_use]
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }
}

impl From<&anyhow::Error> for ExceptionInfo {
    fn from(error: &anyhow::Error) -> Self {
        Self::from_anyhow(error)
    }
}

/// `std::io::error::Error` -> `Error`, `Vec<my::Thing>` -> `Vec<Thing>`
fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        match c {
            ':' => segment.clear(),
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' => {
                out.push_str(&segment);
                segment.clear();
                out.push(c);
            }
            _ => segment.push(c),
        }
    }
    out.push_str(&segment);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::io;

    #[derive(Debug)]
    struct DeployFailed {
        cause: io::Error,
    }

    impl fmt::Display for DeployFailed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "deploy failed")
        }
    }

    impl StdError for DeployFailed {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.cause)
        }
    }

    #[test]
    fn test_from_error_with_source() {
        let err = DeployFailed {
            cause: io::Error::new(io::ErrorKind::TimedOut, "ssh timed out"),
        };
        let info = ExceptionInfo::from_error(&err);

        assert_eq!(info.type_name, "DeployFailed");
        assert_eq!(info.message, "deploy failed");
        assert_eq!(info.inner_message.as_deref(), Some("ssh timed out"));
        assert!(info.stack_trace.is_none());
    }

    #[test]
    fn test_from_io_error() {
        let err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let info = ExceptionInfo::from_error(&err);
        assert_eq!(info.type_name, "Error");
        assert!(info.inner_message.is_none());
    }

    #[test]
    fn test_from_anyhow_chain() {
        let err = anyhow::anyhow!("disk full").context("writing report");
        let info = ExceptionInfo::from(&err);

        assert_eq!(info.message, "writing report");
        assert_eq!(info.inner_message.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("std::io::error::Error"), "Error");
        assert_eq!(short_type_name("alloc::vec::Vec<my::Thing>"), "Vec<Thing>");
        assert_eq!(short_type_name("dyn core::error::Error"), "dyn Error");
    }
}
