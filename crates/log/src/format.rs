//! Rendering entries for the console and the log file

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use colored::Colorize;

use crate::config::{Format, LogConfiguration};
use crate::entry::LogEntry;
use crate::utils::{self, TIMESTAMP_FORMAT};

/// Width of the source column on the console
pub const CONSOLE_SOURCE_WIDTH: usize = 20;

const BANNER: &str = "================================================================================";

/// Console line: `[timestamp] [LEVEL  ] [source              ] message {k=v}`
pub fn console_line(entry: &LogEntry) -> String {
    let mut line = format!(
        "[{}] [{:<7}] [{:<width$}] {}",
        entry.timestamp.format(TIMESTAMP_FORMAT),
        entry.level,
        utils::truncate_string(&entry.source, CONSOLE_SOURCE_WIDTH),
        entry.message,
        width = CONSOLE_SOURCE_WIDTH,
    );
    if !entry.context.is_empty() {
        let _ = write!(line, " {}", entry.context);
    }
    line
}

/// Console line wrapped in the level's color
///
/// `colored` still decides whether escape codes are emitted (terminal
/// detection, `NO_COLOR`, `CLICOLOR_FORCE`).
pub fn colored_console_line(entry: &LogEntry) -> String {
    console_line(entry).color(entry.level.color()).to_string()
}

/// File line in the configured encoding
pub fn file_line(entry: &LogEntry, format: Format) -> String {
    match format {
        Format::Json => json_line(entry),
        Format::Simple => simple_line(entry),
        Format::Structured => structured_line(entry),
    }
}

fn json_line(entry: &LogEntry) -> String {
    serde_json::to_string(entry).unwrap_or_else(|e| {
        // Only reachable with non-string map keys, which Context never has.
        format!(
            r#"{{"timestamp":"{}","level":"{}","message":"entry serialization failed: {}"}}"#,
            entry.timestamp.format(TIMESTAMP_FORMAT),
            entry.level,
            e
        )
    })
}

fn simple_line(entry: &LogEntry) -> String {
    format!(
        "[{}] [{}] {}",
        entry.timestamp.format(TIMESTAMP_FORMAT),
        entry.level,
        entry.message
    )
}

fn structured_line(entry: &LogEntry) -> String {
    let mut line = format!(
        "[{}][{}][PID:{}][TID:{}][{}]",
        entry.timestamp.format(TIMESTAMP_FORMAT),
        entry.level,
        entry.process_id,
        entry.thread_id,
        entry.source,
    );
    if let Some(category) = &entry.category {
        let _ = write!(line, "[{category}]");
    }
    if let Some(event_id) = entry.event_id {
        let _ = write!(line, "[Event:{event_id}]");
    }
    let _ = write!(line, "[{}:{}] {}", entry.script_name, entry.line_number, entry.message);

    if !entry.context.is_empty() {
        let _ = write!(line, " {}", entry.context);
    }
    if let Some(frames) = entry.call_stack.as_deref().filter(|f| !f.is_empty()) {
        let _ = write!(line, " CallStack: {}", frames.join(" -> "));
    }
    if let Some(exception) = &entry.exception {
        let _ = write!(line, " Exception: {} - {}", exception.type_name, exception.message);
        if let Some(stack_trace) = &exception.stack_trace {
            let _ = write!(line, " StackTrace: {}", stack_trace.trim_end());
        }
        if let Some(inner) = &exception.inner_message {
            let _ = write!(line, " InnerException: {inner}");
        }
    }
    line
}

/// Header written to the file when a session is initialized
///
/// JSON files get a single object so every line stays parsable.
pub fn session_header(config: &LogConfiguration, started: DateTime<Local>) -> String {
    let started = started.format(TIMESTAMP_FORMAT).to_string();
    let platform = utils::platform_name();
    let pid = std::process::id();

    match config.format {
        Format::Json => serde_json::json!({
            "timestamp": started,
            "level": "INFO",
            "message": "Logging session started",
            "source": "lab-log",
            "process_id": pid,
            "context": {
                "platform": platform,
                "log_level": config.level,
                "console_level": config.console_level,
                "format": config.format,
            },
        })
        .to_string(),
        Format::Structured | Format::Simple => format!(
            "{BANNER}\nLogging session started: {started}\nPlatform: {platform} | PID: {pid} | Log level: {} | Console level: {} | Format: {}\n{BANNER}",
            config.level, config.console_level, config.format,
        ),
    }
}
