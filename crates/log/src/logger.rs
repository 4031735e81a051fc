//! The logging service
//!
//! [`LabLogger`] owns the configuration, the sinks and the trace registry.
//! It is cheap to clone; clones share state, so one instance per process is
//! created and handed to every caller (or reached through
//! [`crate::global`]).

use std::cell::RefCell;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use colored::Colorize;
use parking_lot::RwLock;

use crate::config::{ConfigUpdate, InitOptions, LogConfiguration};
use crate::context::Context;
use crate::core::{LogError, LogResult};
use crate::entry::{CallSite, LogEntry, LogRequest};
use crate::format;
use crate::level::Level;
use crate::rotation;
use crate::timing::{TraceGuard, TraceRegistry, TraceResult};
use crate::utils;
use crate::writer::{ConsoleWriter, FileWriter, SinkError};

/// Source recorded on performance trace entries
const PERFORMANCE_SOURCE: &str = "PerformanceTrace";

/// Process-wide logging service
#[derive(Debug, Clone)]
pub struct LabLogger {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: RwLock<LogConfiguration>,
    traces: TraceRegistry,
    console: ConsoleWriter,
    file: FileWriter,
}

impl LabLogger {
    /// Logger writing its console output to stdout
    pub fn new(config: LogConfiguration) -> Self {
        Self::with_console(config, ConsoleWriter::stdout())
    }

    /// Logger configured from the `LAB_*` environment variables
    pub fn from_env() -> Self {
        Self::new(LogConfiguration::from_env())
    }

    /// Logger with a custom console target
    pub fn with_console(config: LogConfiguration, console: ConsoleWriter) -> Self {
        Self {
            inner: Arc::new(Inner {
                config: RwLock::new(config),
                traces: TraceRegistry::default(),
                console,
                file: FileWriter::new(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Apply `options` and start a session
    ///
    /// Runs once: when already initialized and `options.force` is not set
    /// this does nothing and returns `Ok(false)`. Otherwise the log
    /// directory is created if missing, a session header is written to the
    /// file (unless [`InitOptions::without_session_header`]) and `Ok(true)`
    /// is returned.
    ///
    /// # Errors
    ///
    /// [`LogError::Config`] when the log directory cannot be created or the
    /// header cannot be written. The configuration is left unchanged then.
    pub fn initialize(&self, options: InitOptions) -> LogResult<bool> {
        let mut config = self.inner.config.write();
        if config.initialized && !options.force {
            return Ok(false);
        }

        let mut next = config.clone();
        options.apply_to(&mut next);

        if next.log_to_file && !options.skip_session_header {
            self.start_session(&next)?;
        }

        *config = next;
        Ok(true)
    }

    fn start_session(&self, config: &LogConfiguration) -> LogResult<()> {
        let path = &config.log_file_path;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| LogError::unwritable_directory(dir, e))?;
        }

        let header = format::session_header(config, Local::now());
        let failure = RefCell::new(None);
        let written = self.inner.file.append(path, &header, config.rotation_policy(), &|e| {
            failure.borrow_mut().get_or_insert(e);
        });

        match failure.into_inner() {
            Some(SinkError::Write { path, source }) => Err(LogError::Config {
                message: format!("cannot write session header to '{}'", path.display()),
                source: Some(source),
            }),
            Some(rotation @ SinkError::Rotation { .. }) if written => {
                // The header still landed; rotation trouble is not fatal.
                self.emit_failure(config.console_colors, rotation);
                Ok(())
            }
            Some(other) => Err(LogError::config(other.to_string())),
            None => Ok(()),
        }
    }

    /// Whether [`LabLogger::initialize`] has run
    pub fn is_initialized(&self) -> bool {
        self.inner.config.read().initialized
    }

    /// Snapshot of the current configuration
    pub fn configuration(&self) -> LogConfiguration {
        self.inner.config.read().clone()
    }

    /// Apply a partial update
    pub fn set_configuration(&self, update: ConfigUpdate) {
        update.apply_to(&mut self.inner.config.write());
    }

    // ------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------

    /// Write one entry
    ///
    /// Never fails: sink problems are reported as `[LOG ERROR]` console
    /// lines. A logger that was never initialized initializes itself first.
    pub fn log(&self, request: LogRequest) {
        if !self.is_initialized() {
            self.auto_initialize();
        }

        let config = self.configuration();
        let to_console = !request.no_console && config.console_accepts(request.level);
        let to_file = !request.no_file && config.file_accepts(request.level);
        if !to_console && !to_file {
            return;
        }

        let entry = request.into_entry(config.enable_call_stack);
        if to_console {
            self.write_console(&entry, &config);
        }
        if to_file {
            self.write_file(&entry, &config);
        }
    }

    /// Shorthand for `log(LogRequest::new(level, message))`
    #[track_caller]
    pub fn write(&self, level: Level, message: impl Into<String>) {
        self.log(LogRequest::new(level, message));
    }

    /// TRACE entry, only emitted when trace output is enabled
    #[track_caller]
    pub fn trace(&self, message: impl Into<String>, context: Option<Context>) {
        if !self.inner.config.read().enable_trace {
            return;
        }
        let mut request = LogRequest::new(Level::Trace, message);
        if let Some(context) = context {
            request = request.context(context);
        }
        self.log(request);
    }

    /// DEBUG entry carrying a snapshot of variables
    #[track_caller]
    pub fn debug_context(&self, message: impl Into<String>, variables: Context) {
        self.log(
            LogRequest::new(Level::Debug, message)
                .category("DebugContext")
                .context(variables),
        );
    }

    /// Rotate the active file now, whatever its size
    ///
    /// Returns whether it rotated. A missing active file leaves the archives
    /// untouched and returns `false`; failures are reported on the console.
    pub fn rotate_now(&self) -> bool {
        let config = self.configuration();
        match self
            .inner
            .file
            .force_rotate(&config.log_file_path, config.rotation_policy())
        {
            Ok(rotated) => rotated,
            Err(e) => {
                self.report_failure(e);
                false
            }
        }
    }

    /// Archives of the active file present on disk, newest first
    ///
    /// # Errors
    ///
    /// [`LogError::Io`] when the log directory cannot be read.
    pub fn archives(&self) -> LogResult<Vec<PathBuf>> {
        let path = self.inner.config.read().log_file_path.clone();
        let archives = rotation::list_archives(&path)?;
        Ok(archives.into_iter().map(|(_, archive)| archive).collect())
    }

    fn auto_initialize(&self) {
        if let Err(e) = self.initialize(InitOptions::default()) {
            self.report_failure(format_args!("Automatic initialization failed: {e}"));
        }
    }

    fn write_console(&self, entry: &LogEntry, config: &LogConfiguration) {
        let line = if config.console_colors {
            format::colored_console_line(entry)
        } else {
            format::console_line(entry)
        };
        self.inner.console.write_line(&line);
    }

    fn write_file(&self, entry: &LogEntry, config: &LogConfiguration) {
        let line = format::file_line(entry, config.format);
        self.inner.file.append(
            &config.log_file_path,
            &line,
            config.rotation_policy(),
            &|e| self.emit_failure(config.console_colors, e),
        );
    }

    fn report_failure(&self, message: impl Display) {
        let colors = self.inner.config.read().console_colors;
        self.emit_failure(colors, message);
    }

    /// Must not take the configuration lock; `initialize` calls it while
    /// holding the write half.
    fn emit_failure(&self, colors: bool, message: impl Display) {
        let line = format!("[LOG ERROR] {message}");
        if colors {
            self.inner.console.write_line(&line.red().to_string());
        } else {
            self.inner.console.write_line(&line);
        }
    }

    // ------------------------------------------------------------------
    // Performance traces
    // ------------------------------------------------------------------

    /// Start the trace `name`
    ///
    /// Does nothing unless performance tracing is enabled. Restarting a
    /// running name replaces it.
    #[track_caller]
    pub fn start_trace(&self, name: &str, context: Option<Context>) {
        self.start_trace_at(name, context, CallSite::caller());
    }

    fn start_trace_at(&self, name: &str, context: Option<Context>, site: CallSite) {
        if !self.inner.config.read().enable_performance {
            return;
        }
        let context = context.unwrap_or_default();
        self.inner.traces.start(name, context.clone());

        self.log(
            LogRequest::new(Level::Trace, format!("Performance trace started: {name}"))
                .at(site.file, site.line)
                .source(PERFORMANCE_SOURCE)
                .context(context),
        );
    }

    /// Stop the trace `name`
    ///
    /// Returns `None` when performance tracing is disabled or `name` is not
    /// running.
    #[track_caller]
    pub fn stop_trace(&self, name: &str, additional: Option<Context>) -> Option<TraceResult> {
        self.stop_trace_at(name, additional, CallSite::caller())
    }

    pub(crate) fn stop_trace_at(
        &self,
        name: &str,
        additional: Option<Context>,
        site: CallSite,
    ) -> Option<TraceResult> {
        if !self.inner.config.read().enable_performance {
            return None;
        }
        let (counter, result) = self.inner.traces.stop(name)?;

        let mut context = Context::merge_optional(Some(&counter.context), additional.as_ref());
        context.insert("duration", utils::format_duration(result.elapsed()));
        context.insert("elapsed_ms", result.elapsed_milliseconds);

        self.log(
            LogRequest::new(Level::Trace, format!("Performance trace completed: {name}"))
                .at(site.file, site.line)
                .source(PERFORMANCE_SOURCE)
                .context(context),
        );
        Some(result)
    }

    /// Start `name` and stop it when the returned guard drops
    #[track_caller]
    pub fn trace_scope(&self, name: impl Into<String>) -> TraceGuard {
        let name = name.into();
        let site = CallSite::caller();
        self.start_trace_at(&name, None, site);
        TraceGuard::new(self.clone(), name, site)
    }

    /// Number of traces started and not yet stopped
    pub fn active_traces(&self) -> usize {
        self.inner.traces.len()
    }
}
