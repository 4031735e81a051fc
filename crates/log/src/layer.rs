//! Bridge from `tracing` into a [`LabLogger`]
//!
//! Libraries instrumented with `tracing` end up in the same console and file
//! sinks as direct calls:
//!
//! ```rust,no_run
//! use lab_log::{LabLogLayer, LabLogger};
//! use tracing_subscriber::layer::SubscriberExt;
//! use tracing_subscriber::util::SubscriberInitExt;
//!
//! let logger = LabLogger::from_env();
//! tracing_subscriber::registry()
//!     .with(LabLogLayer::new(logger))
//!     .init();
//!
//! tracing::info!(repo = "lab", "sync finished");
//! ```

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer};

use crate::context::Context;
use crate::entry::LogRequest;
use crate::level::Level;
use crate::logger::LabLogger;

/// Layer forwarding every `tracing` event to a [`LabLogger`]
///
/// The event's `message` field becomes the message, its other fields the
/// context, and its target the source.
#[derive(Debug, Clone)]
pub struct LabLogLayer {
    logger: LabLogger,
}

impl LabLogLayer {
    /// Create a layer writing to `logger`
    pub fn new(logger: LabLogger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for LabLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut request = LogRequest::new(Level::from(*metadata.level()), visitor.message)
            .source(metadata.target());
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            request = request.at(file, line);
        }
        if !visitor.fields.is_empty() {
            request = request.context(visitor.fields);
        }

        self.logger.log(request);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Context,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name(), value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name(), value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name(), value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.insert(field.name(), format!("{value:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InitOptions, LogConfiguration};
    use crate::writer::ConsoleWriter;
    use tempfile::TempDir;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_events_reach_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge.log");
        let logger = LabLogger::with_console(
            LogConfiguration {
                log_file_path: path.clone(),
                enable_call_stack: false,
                ..LogConfiguration::default()
            },
            ConsoleWriter::new(std::io::sink),
        );
        logger.initialize(InitOptions::new()).unwrap();

        let subscriber = tracing_subscriber::registry().with(LabLogLayer::new(logger));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(repo = "lab-infra", attempts = 3_u64, "sync finished");
            tracing::debug!("below the INFO threshold");
        });

        let content = std::fs::read_to_string(&path).unwrap();
        let line = content
            .lines()
            .find(|l| l.contains("sync finished"))
            .expect("bridged event in file");
        assert!(line.contains("[INFO]"));
        assert!(line.contains("[lab_log::layer::tests]"));
        assert!(line.contains("{repo=lab-infra, attempts=3}"));
        assert!(!content.contains("below the INFO threshold"));
    }
}
