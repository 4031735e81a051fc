//! Partial updates and initialization options

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Format, LogConfiguration};
use crate::core::LogResult;
use crate::level::Level;

/// Partial configuration update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    /// File threshold
    pub level: Option<Level>,
    /// Console threshold
    pub console_level: Option<Level>,
    /// Active log file
    pub log_file_path: Option<PathBuf>,
    /// Rotation size in MiB
    pub max_log_size_mb: Option<u64>,
    /// Number of kept archives
    pub max_log_files: Option<usize>,
    /// Trace output toggle
    pub enable_trace: Option<bool>,
    /// Performance trace toggle
    pub enable_performance: Option<bool>,
    /// Call-stack capture toggle
    pub enable_call_stack: Option<bool>,
    /// File sink toggle
    pub log_to_file: Option<bool>,
    /// Console sink toggle
    pub log_to_console: Option<bool>,
    /// Console color toggle
    pub console_colors: Option<bool>,
    /// File encoding
    pub format: Option<Format>,
}

impl ConfigUpdate {
    /// Create an empty update
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file threshold
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the console threshold
    #[must_use]
    pub fn console_level(mut self, level: Level) -> Self {
        self.console_level = Some(level);
        self
    }

    /// Set the active log file
    #[must_use]
    pub fn log_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file_path = Some(path.into());
        self
    }

    /// Set the rotation size in MiB
    #[must_use]
    pub fn max_log_size_mb(mut self, mb: u64) -> Self {
        self.max_log_size_mb = Some(mb);
        self
    }

    /// Set the number of kept archives
    #[must_use]
    pub fn max_log_files(mut self, files: usize) -> Self {
        self.max_log_files = Some(files);
        self
    }

    /// Toggle [`crate::LabLogger::trace`] output
    #[must_use]
    pub fn enable_trace(mut self, enabled: bool) -> Self {
        self.enable_trace = Some(enabled);
        self
    }

    /// Toggle performance traces
    #[must_use]
    pub fn enable_performance(mut self, enabled: bool) -> Self {
        self.enable_performance = Some(enabled);
        self
    }

    /// Toggle call-stack capture
    #[must_use]
    pub fn enable_call_stack(mut self, enabled: bool) -> Self {
        self.enable_call_stack = Some(enabled);
        self
    }

    /// Toggle the file sink
    #[must_use]
    pub fn log_to_file(mut self, enabled: bool) -> Self {
        self.log_to_file = Some(enabled);
        self
    }

    /// Toggle the console sink
    #[must_use]
    pub fn log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    /// Toggle console colors
    #[must_use]
    pub fn console_colors(mut self, enabled: bool) -> Self {
        self.console_colors = Some(enabled);
        self
    }

    /// Set the file encoding
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Apply to `config`
    pub fn apply_to(&self, config: &mut LogConfiguration) {
        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &self.$field {
                        config.$field = value.clone();
                    }
                )*
            };
        }

        apply!(
            level,
            console_level,
            log_file_path,
            max_log_size_mb,
            max_log_files,
            enable_trace,
            enable_performance,
            enable_call_stack,
            log_to_file,
            log_to_console,
            console_colors,
            format,
        );
    }
}

/// Options for [`crate::LabLogger::initialize`]
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Overrides the configured log file
    pub log_path: Option<PathBuf>,
    /// File threshold, configured value when `None`
    pub log_level: Option<Level>,
    /// Console threshold, configured value when `None`
    pub console_level: Option<Level>,
    /// Turn trace output on (never turns it off)
    pub enable_trace: bool,
    /// Turn performance traces on (never turns them off)
    pub enable_performance: bool,
    /// Re-initialize even when already initialized
    pub force: bool,
    /// Mark the logger initialized without writing a session header
    pub skip_session_header: bool,
}

impl InitOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with levels given by name
    ///
    /// # Errors
    ///
    /// Returns [`crate::LogError::InvalidLevel`] for an unknown name.
    pub fn parse_levels(log_level: &str, console_level: &str) -> LogResult<Self> {
        Ok(Self {
            log_level: Some(log_level.parse()?),
            console_level: Some(console_level.parse()?),
            ..Self::default()
        })
    }

    /// Set the log file
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Set the file threshold
    #[must_use]
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the console threshold
    #[must_use]
    pub fn console_level(mut self, level: Level) -> Self {
        self.console_level = Some(level);
        self
    }

    /// Enable [`crate::LabLogger::trace`] output
    #[must_use]
    pub fn enable_trace(mut self, enabled: bool) -> Self {
        self.enable_trace = enabled;
        self
    }

    /// Enable performance traces
    #[must_use]
    pub fn enable_performance(mut self, enabled: bool) -> Self {
        self.enable_performance = enabled;
        self
    }

    /// Re-initialize even when already initialized
    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Continue an existing session: no header is written
    ///
    /// For short-lived processes appending to a file another process
    /// already started a session in.
    #[must_use]
    pub fn without_session_header(mut self) -> Self {
        self.skip_session_header = true;
        self
    }

    /// Apply to `config` and mark it initialized
    pub(crate) fn apply_to(&self, config: &mut LogConfiguration) {
        if let Some(path) = &self.log_path {
            config.log_file_path.clone_from(path);
        }
        if let Some(level) = self.log_level {
            config.level = level;
        }
        if let Some(level) = self.console_level {
            config.console_level = level;
        }
        config.enable_trace |= self.enable_trace;
        config.enable_performance |= self.enable_performance;
        config.initialized = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_update_touches_only_given_fields() {
        let mut config = LogConfiguration::default();
        let before = config.clone();

        ConfigUpdate::new()
            .console_level(Level::Verbose)
            .format(Format::Json)
            .apply_to(&mut config);

        assert_eq!(config.console_level, Level::Verbose);
        assert_eq!(config.format, Format::Json);
        assert_eq!(
            LogConfiguration {
                console_level: before.console_level,
                format: before.format,
                ..config
            },
            before
        );
    }

    #[test]
    fn test_update_from_json() {
        let update: ConfigUpdate =
            serde_json::from_str(r#"{"level":"DEBUG","max_log_files":2}"#).unwrap();
        assert_eq!(update, ConfigUpdate::new().level(Level::Debug).max_log_files(2));
    }

    #[test]
    fn test_init_options_parse_levels() {
        let options = InitOptions::parse_levels("debug", "error").unwrap();
        assert_eq!(options.log_level, Some(Level::Debug));
        assert_eq!(options.console_level, Some(Level::Error));

        assert!(InitOptions::parse_levels("debug", "shout").is_err());
    }

    #[test]
    fn test_init_options_mark_initialized() {
        let mut config = LogConfiguration::default();
        InitOptions::new()
            .log_path("/tmp/x.log")
            .enable_performance(true)
            .apply_to(&mut config);

        assert!(config.initialized);
        assert!(config.enable_performance);
        assert!(!config.enable_trace);
        assert_eq!(config.log_file_path, PathBuf::from("/tmp/x.log"));
    }
}
