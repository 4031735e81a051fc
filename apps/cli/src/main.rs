//! lablog - write to the lab log from shell scripts
//!
//! ## Usage
//!
//! ```bash
//! # Start a session with DEBUG in the file and INFO on the console
//! lablog init --log-level DEBUG --console-level INFO
//!
//! # Write an entry
//! lablog log "Copied 14 workflows" --level SUCCESS --context count=14
//!
//! # Inspect the effective configuration
//! lablog config
//!
//! # Rotate the active file now
//! lablog rotate
//! ```
//!
//! Every flag not given on the command line falls back to the `LAB_*`
//! environment variables. Each invocation is its own process, so thresholds
//! are read from `LAB_LOG_LEVEL` / `LAB_CONSOLE_LEVEL` on every call; only
//! `init` writes a session header, `log` appends to the running session.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use lab_log::{Context, InitOptions, LabLogger, Level, LogConfiguration, LogRequest};

/// Source recorded when `--source` is not given
const DEFAULT_SOURCE: &str = "lablog";

/// Lab automation logger
#[derive(Parser)]
#[command(name = "lablog")]
#[command(version)]
#[command(about = "Write leveled entries to the lab automation log")]
struct Cli {
    /// Active log file
    #[arg(long, global = true, env = "LAB_LOG_PATH")]
    log_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one entry
    Log {
        /// Message text
        message: String,

        /// Entry level
        #[arg(short, long, default_value = "INFO")]
        level: Level,

        /// Source shown instead of "lablog"
        #[arg(short, long)]
        source: Option<String>,

        /// Category label
        #[arg(long)]
        category: Option<String>,

        /// Numeric event id
        #[arg(long)]
        event_id: Option<u32>,

        /// Context field as key=value (repeatable)
        #[arg(short, long = "context", value_parser = parse_key_value)]
        context: Vec<(String, String)>,

        /// Skip the console sink
        #[arg(long)]
        no_console: bool,

        /// Skip the file sink
        #[arg(long)]
        no_file: bool,
    },

    /// Write a session header to the log file
    ///
    /// Levels given here describe the session in its header. Later `log`
    /// calls take their thresholds from LAB_LOG_LEVEL and LAB_CONSOLE_LEVEL.
    Init {
        /// File threshold
        #[arg(long, env = "LAB_LOG_LEVEL")]
        log_level: Option<Level>,

        /// Console threshold
        #[arg(long, env = "LAB_CONSOLE_LEVEL")]
        console_level: Option<Level>,

        /// Emit TRACE entries written through the trace helper
        #[arg(long)]
        trace: bool,

        /// Record performance traces
        #[arg(long)]
        performance: bool,

        /// Start a new session even if one is running
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as JSON
    Config,

    /// Rotate the active log file
    Rotate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = LogConfiguration::from_env();
    if let Some(path) = cli.log_path {
        config.log_file_path = path;
    }
    let logger = LabLogger::new(config);

    match cli.command {
        Commands::Log {
            message,
            level,
            source,
            category,
            event_id,
            context,
            no_console,
            no_file,
        } => {
            logger
                .initialize(InitOptions::new().without_session_header())
                .context("Failed to initialize logging")?;

            let mut request = LogRequest::new(level, message)
                .source(source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()));
            if !context.is_empty() {
                request = request.context(to_context(context));
            }
            if let Some(category) = category {
                request = request.category(category);
            }
            if let Some(event_id) = event_id {
                request = request.event_id(event_id);
            }
            if no_console {
                request = request.no_console();
            }
            if no_file {
                request = request.no_file();
            }
            logger.log(request);
        }

        Commands::Init {
            log_level,
            console_level,
            trace,
            performance,
            force,
        } => {
            let mut options = InitOptions::new()
                .enable_trace(trace)
                .enable_performance(performance)
                .force(force);
            if let Some(level) = log_level {
                options = options.log_level(level);
            }
            if let Some(level) = console_level {
                options = options.console_level(level);
            }

            logger
                .initialize(options)
                .context("Failed to initialize logging")?;
            let config = logger.configuration();
            println!(
                "Session started: {} (file {}, console {})",
                config.log_file_path.display(),
                config.level,
                config.console_level
            );
            println!("Later log calls read their thresholds from LAB_LOG_LEVEL and LAB_CONSOLE_LEVEL");
        }

        Commands::Config => {
            let json = serde_json::to_string_pretty(&logger.configuration())
                .context("Failed to serialize configuration")?;
            println!("{json}");
        }

        Commands::Rotate => {
            let path = logger.configuration().log_file_path;
            if logger.rotate_now() {
                let archives = logger.archives().context("Failed to list archives")?;
                println!("Rotated {} ({} archives)", path.display(), archives.len());
            } else {
                println!("Nothing to rotate: {} does not exist", path.display());
            }
        }
    }

    Ok(())
}

/// Parse `key=value`
fn parse_key_value(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("expected key=value, got '{raw}'"))?;
    anyhow::ensure!(!key.is_empty(), "empty key in '{raw}'");
    Ok((key.to_string(), value.to_string()))
}

/// Numbers and booleans keep their JSON type; everything else is a string
fn to_context(pairs: Vec<(String, String)>) -> Context {
    pairs
        .into_iter()
        .map(|(key, value)| {
            let value = serde_json::from_str::<serde_json::Value>(&value)
                .ok()
                .filter(|v| v.is_number() || v.is_boolean())
                .unwrap_or(serde_json::Value::String(value));
            (key, value)
        })
        .collect()
}
