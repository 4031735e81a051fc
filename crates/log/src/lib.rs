//! # Lab Log - centralized logging for lab-automation tooling
//!
//! One leveled logger with two independently gated sinks (console and file),
//! size-based file rotation, Structured / Simple / JSON file encodings,
//! call-stack capture and named performance traces.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lab_log::prelude::*;
//!
//! fn main() -> lab_log::LogResult<()> {
//!     let logger = LabLogger::from_env();
//!     logger.initialize(InitOptions::parse_levels("DEBUG", "INFO")?)?;
//!
//!     log_info!(logger, "Reorganizing {} workflow files", 14);
//!     logger.log(
//!         LogRequest::new(Level::Warn, "Archive skipped")
//!             .context(context! { "dir" => ".github/workflows" }),
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Levels
//!
//! `SILENT(0) < ERROR(1) < WARN(2) < INFO = SUCCESS(3) < DEBUG(4) < TRACE(5) < VERBOSE(6)`.
//! A message reaches a sink when its rank is at most the sink's threshold.
//!
//! ## Environment
//!
//! Defaults come from `LAB_LOG_LEVEL`, `LAB_CONSOLE_LEVEL`, `LAB_LOG_PATH`,
//! `LAB_MAX_LOG_SIZE_MB`, `LAB_MAX_LOG_FILES`, `LAB_ENABLE_TRACE`,
//! `LAB_ENABLE_PERFORMANCE`, `LAB_LOG_FORMAT`, `LAB_ENABLE_CALLSTACK`,
//! `LAB_LOG_TO_FILE` and `LAB_LOG_TO_CONSOLE`.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod callstack;
mod config;
pub mod context;
mod core;
mod entry;
mod exception;
mod format;
mod layer;
mod level;
mod logger;
mod macros;
mod rotation;
mod timing;
mod utils;
mod writer;

use std::sync::OnceLock;

// Public API
pub use config::{ConfigUpdate, ENV_VARS, Format, InitOptions, LogConfiguration};
pub use context::Context;
pub use crate::core::{LogError, LogResult};
pub use entry::{CallSite, LogEntry, LogRequest};
pub use exception::ExceptionInfo;
pub use format::{console_line, file_line, session_header};
pub use layer::LabLogLayer;
pub use level::Level;
pub use logger::LabLogger;
pub use rotation::{RotationPolicy, archive_path, list_archives};
pub use timing::{PerformanceCounter, TraceGuard, TraceResult};
pub use utils::format_duration;
pub use writer::{ConsoleWriter, FileWriter, SinkError};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ConfigUpdate, Context, InitOptions, LabLogger, Level, LogRequest, LogResult, context,
        log_debug, log_error, log_info, log_success, log_trace, log_verbose, log_warn, timed,
    };
}

/// Process-wide logger built from the environment on first use
///
/// Scripts that cannot pass a [`LabLogger`] around share this one. Code that
/// owns its logger should prefer an explicit instance. Loggers writing the
/// same path share one file lock per process, so this one and a local
/// instance never rotate the file at the same time.
pub fn global() -> &'static LabLogger {
    static GLOBAL: OnceLock<LabLogger> = OnceLock::new();
    GLOBAL.get_or_init(LabLogger::from_env)
}
