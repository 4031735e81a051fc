//! Log entries and the requests that produce them

use std::panic::Location;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::callstack;
use crate::context::Context;
use crate::exception::ExceptionInfo;
use crate::level::Level;
use crate::utils;

/// Maximum number of frames kept in a captured call stack
const MAX_STACK_FRAMES: usize = 32;

/// Where a log call was made
///
/// File and line come from [`Location::caller`] or the `file!`/`line!`
/// macros. The function path is only known when a macro supplied it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Source file of the call
    pub file: &'static str,
    /// Line of the call
    pub line: u32,
    /// Fully qualified path of the enclosing function
    pub function: Option<&'static str>,
}

impl CallSite {
    /// Call site of the caller
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
            function: None,
        }
    }

    /// File name without directories
    pub fn script_name(&self) -> &'static str {
        Path::new(self.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.file)
    }

    /// Short name of the enclosing function, if it is not top-level scope
    ///
    /// Closure segments are stripped, so a call inside a closure in
    /// `deploy::run` resolves to `run`. A binary's `main` counts as
    /// top-level scope.
    pub fn function_name(&self) -> Option<&'static str> {
        let path = self.function?;
        let name = path.rsplit("::").find(|segment| !segment.starts_with("{{"))?;
        (name != "main" && !name.is_empty()).then_some(name)
    }

    /// Enclosing function name, or the script's file name at top level
    pub fn source(&self) -> &'static str {
        self.function_name().unwrap_or_else(|| self.script_name())
    }
}

/// One log call, as assembled by the caller
#[derive(Debug, Clone)]
pub struct LogRequest {
    pub(crate) level: Level,
    pub(crate) message: String,
    pub(crate) call_site: CallSite,
    pub(crate) source: Option<String>,
    pub(crate) context: Option<Context>,
    pub(crate) additional_data: Option<Context>,
    pub(crate) category: Option<String>,
    pub(crate) event_id: Option<u32>,
    pub(crate) no_console: bool,
    pub(crate) no_file: bool,
    pub(crate) exception: Option<ExceptionInfo>,
}

impl LogRequest {
    /// Create a request; the call site is the caller's location
    #[track_caller]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            call_site: CallSite::caller(),
            source: None,
            context: None,
            additional_data: None,
            category: None,
            event_id: None,
            no_console: false,
            no_file: false,
            exception: None,
        }
    }

    /// Override the captured file and line
    #[must_use]
    pub fn at(mut self, file: &'static str, line: u32) -> Self {
        self.call_site.file = file;
        self.call_site.line = line;
        self
    }

    /// Record the enclosing function path, see [`crate::function_name!`]
    #[must_use]
    pub fn function(mut self, path: &'static str) -> Self {
        self.call_site.function = Some(path);
        self
    }

    /// Explicit source, replaces the resolved one
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Base context
    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    /// Extra data merged over the base context
    #[must_use]
    pub fn additional_data(mut self, data: Context) -> Self {
        self.additional_data = Some(data);
        self
    }

    /// Category label
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Numeric event id
    #[must_use]
    pub fn event_id(mut self, event_id: u32) -> Self {
        self.event_id = Some(event_id);
        self
    }

    /// Skip the console for this call
    #[must_use]
    pub fn no_console(mut self) -> Self {
        self.no_console = true;
        self
    }

    /// Skip the file for this call
    #[must_use]
    pub fn no_file(mut self) -> Self {
        self.no_file = true;
        self
    }

    /// Attach an error
    #[must_use]
    pub fn exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Attach a [`std::error::Error`]
    #[must_use]
    pub fn error<E>(self, error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        self.exception(ExceptionInfo::from_error(error))
    }

    /// Level of this request
    pub fn level(&self) -> Level {
        self.level
    }

    /// Build the entry
    pub(crate) fn into_entry(self, capture_call_stack: bool) -> LogEntry {
        let source = self
            .source
            .unwrap_or_else(|| self.call_site.source().to_string());
        let call_stack = (capture_call_stack && self.level.captures_call_stack())
            .then(|| callstack::capture(MAX_STACK_FRAMES));

        LogEntry {
            timestamp: Local::now(),
            level: self.level,
            message: self.message,
            source,
            process_id: std::process::id(),
            thread_id: utils::current_thread_id(),
            script_name: self.call_site.script_name().to_string(),
            line_number: self.call_site.line,
            function_name: self.call_site.function_name().map(String::from),
            context: Context::merge_optional(self.context.as_ref(), self.additional_data.as_ref()),
            category: self.category,
            event_id: self.event_id,
            call_stack,
            exception: self.exception,
        }
    }
}

/// A fully resolved log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Local time of the call
    #[serde(with = "utils::timestamp")]
    pub timestamp: DateTime<Local>,
    /// Severity
    pub level: Level,
    /// Message text
    pub message: String,
    /// Function, script or explicit source name
    pub source: String,
    /// Operating system process id
    pub process_id: u32,
    /// Logger-assigned thread number
    pub thread_id: u64,
    /// File name of the call site
    pub script_name: String,
    /// Line of the call site
    pub line_number: u32,
    /// Enclosing function, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Merged context
    #[serde(default, skip_serializing_if = "Context::is_empty")]
    pub context: Context,
    /// Category label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Event id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<u32>,
    /// Captured frames, innermost first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_stack: Option<Vec<String>>,
    /// Attached error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionInfo>,
}
