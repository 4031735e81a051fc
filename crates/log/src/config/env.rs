//! Defaults from `LAB_*` environment variables
//!
//! Variables are read once, when the configuration is built. Values that do
//! not parse keep the built-in default so a typo never stops a script.

use std::path::PathBuf;

use super::LogConfiguration;

/// Every environment variable consulted by [`LogConfiguration::from_env`]
pub const ENV_VARS: [&str; 11] = [
    "LAB_LOG_LEVEL",
    "LAB_CONSOLE_LEVEL",
    "LAB_LOG_PATH",
    "LAB_MAX_LOG_SIZE_MB",
    "LAB_MAX_LOG_FILES",
    "LAB_ENABLE_TRACE",
    "LAB_ENABLE_PERFORMANCE",
    "LAB_LOG_FORMAT",
    "LAB_ENABLE_CALLSTACK",
    "LAB_LOG_TO_FILE",
    "LAB_LOG_TO_CONSOLE",
];

impl LogConfiguration {
    /// Create configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup("LAB_LOG_LEVEL").and_then(|v| v.parse().ok()) {
            config.level = level;
        }
        if let Some(level) = lookup("LAB_CONSOLE_LEVEL").and_then(|v| v.parse().ok()) {
            config.console_level = level;
        }
        if let Some(path) = lookup("LAB_LOG_PATH").filter(|v| !v.trim().is_empty()) {
            config.log_file_path = PathBuf::from(path);
        }
        if let Some(mb) = lookup("LAB_MAX_LOG_SIZE_MB").and_then(|v| v.trim().parse().ok()) {
            config.max_log_size_mb = mb;
        }
        if let Some(files) = lookup("LAB_MAX_LOG_FILES").and_then(|v| v.trim().parse().ok()) {
            config.max_log_files = files;
        }
        if let Some(format) = lookup("LAB_LOG_FORMAT").and_then(|v| v.parse().ok()) {
            config.format = format;
        }

        let flag = |key: &str, current: bool| lookup(key).and_then(|v| parse_flag(&v)).unwrap_or(current);
        config.enable_trace = flag("LAB_ENABLE_TRACE", config.enable_trace);
        config.enable_performance = flag("LAB_ENABLE_PERFORMANCE", config.enable_performance);
        config.enable_call_stack = flag("LAB_ENABLE_CALLSTACK", config.enable_call_stack);
        config.log_to_file = flag("LAB_LOG_TO_FILE", config.log_to_file);
        config.log_to_console = flag("LAB_LOG_TO_CONSOLE", config.log_to_console);

        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Format;
    use crate::level::Level;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = LogConfiguration::from_lookup(|_| None);
        assert_eq!(config, LogConfiguration::default());
    }

    #[test]
    fn test_all_variables() {
        let config = LogConfiguration::from_lookup(lookup_from(&[
            ("LAB_LOG_LEVEL", "debug"),
            ("LAB_CONSOLE_LEVEL", "ERROR"),
            ("LAB_LOG_PATH", "/var/log/lab/run.log"),
            ("LAB_MAX_LOG_SIZE_MB", "5"),
            ("LAB_MAX_LOG_FILES", "3"),
            ("LAB_ENABLE_TRACE", "true"),
            ("LAB_ENABLE_PERFORMANCE", "1"),
            ("LAB_LOG_FORMAT", "JSON"),
            ("LAB_ENABLE_CALLSTACK", "false"),
            ("LAB_LOG_TO_FILE", "no"),
            ("LAB_LOG_TO_CONSOLE", "off"),
        ]));

        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.console_level, Level::Error);
        assert_eq!(config.log_file_path, PathBuf::from("/var/log/lab/run.log"));
        assert_eq!(config.max_log_size_mb, 5);
        assert_eq!(config.max_log_files, 3);
        assert!(config.enable_trace);
        assert!(config.enable_performance);
        assert_eq!(config.format, Format::Json);
        assert!(!config.enable_call_stack);
        assert!(!config.log_to_file);
        assert!(!config.log_to_console);
    }

    #[test]
    fn test_unparsable_values_keep_defaults() {
        let config = LogConfiguration::from_lookup(lookup_from(&[
            ("LAB_LOG_LEVEL", "chatty"),
            ("LAB_MAX_LOG_SIZE_MB", "lots"),
            ("LAB_ENABLE_CALLSTACK", "maybe"),
            ("LAB_LOG_PATH", "   "),
        ]));
        let defaults = LogConfiguration::default();

        assert_eq!(config.level, defaults.level);
        assert_eq!(config.max_log_size_mb, defaults.max_log_size_mb);
        assert_eq!(config.enable_call_stack, defaults.enable_call_stack);
        assert_eq!(config.log_file_path, defaults.log_file_path);
    }
}
