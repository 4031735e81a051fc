//! Shared helpers for integration tests

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use lab_log::{ConsoleWriter, LabLogger, LogConfiguration};
use parking_lot::Mutex;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory console target
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().clone()).expect("console output is UTF-8")
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A logger writing `lab.log` inside a fresh temp dir
pub struct Harness {
    pub dir: TempDir,
    pub logger: LabLogger,
    pub console: Capture,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(|_| {})
    }

    pub fn with(adjust: impl FnOnce(&mut LogConfiguration)) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let mut config = LogConfiguration {
            log_file_path: dir.path().join("lab.log"),
            console_colors: false,
            ..LogConfiguration::default()
        };
        adjust(&mut config);

        let console = Capture::default();
        let logger = LabLogger::with_console(config, ConsoleWriter::new(console.clone()));
        Self {
            dir,
            logger,
            console,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("lab.log")
    }

    pub fn file_text(&self) -> String {
        std::fs::read_to_string(self.log_path()).unwrap_or_default()
    }
}
