//! Console and file sinks

// Standard library
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

// External dependencies
use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

// Internal crates
use crate::rotation::RotationPolicy;

/// Failure inside a sink; reported on the console, never returned to callers
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Rotating the active file failed
    #[error("Log rotation failed for '{}': {source}", path.display())]
    Rotation {
        /// Active log file
        path: PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// Appending to the active file failed
    #[error("Failed to write to log file '{}': {source}", path.display())]
    Write {
        /// Active log file
        path: PathBuf,
        /// Underlying failure
        source: io::Error,
    },
}

/// Console sink
///
/// Wraps any `tracing_subscriber` [`MakeWriter`]; stdout by default. Lines
/// are written under a lock so concurrent callers never interleave.
pub struct ConsoleWriter {
    make_writer: BoxMakeWriter,
    lock: Mutex<()>,
}

impl ConsoleWriter {
    /// Write to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout)
    }

    /// Write to stderr
    pub fn stderr() -> Self {
        Self::new(io::stderr)
    }

    /// Write to a custom target
    pub fn new<M>(make_writer: M) -> Self
    where
        M: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Self {
            make_writer: BoxMakeWriter::new(make_writer),
            lock: Mutex::new(()),
        }
    }

    /// Write one line; console failures are dropped since there is nowhere
    /// left to report them
    pub fn write_line(&self, line: &str) {
        let _guard = self.lock.lock();
        let mut writer = self.make_writer.make_writer();
        let _ = writeln!(writer, "{line}");
        let _ = writer.flush();
    }
}

impl std::fmt::Debug for ConsoleWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleWriter").finish_non_exhaustive()
    }
}

/// File sink
///
/// Writers share one lock per path across the whole process, so two loggers
/// pointed at the same file (say [`crate::global`] and a local instance)
/// never both decide to rotate. The lock spans size check, rotation and
/// append. Paths are compared as given, not canonicalized.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileWriter;

impl FileWriter {
    /// Create a file sink
    pub fn new() -> Self {
        Self
    }

    /// Rotate if needed, then append `text` plus a newline to `path`
    ///
    /// A failed rotation is reported and the append still happens. Returns
    /// whether the text reached the file.
    pub fn append(
        &self,
        path: &Path,
        text: &str,
        policy: RotationPolicy,
        report: &dyn Fn(SinkError),
    ) -> bool {
        let lock = path_lock(path);
        let _guard = lock.lock();

        if let Err(source) = policy.rotate_if_needed(path) {
            report(SinkError::Rotation {
                path: path.to_path_buf(),
                source,
            });
        }

        match append_line(path, text) {
            Ok(()) => true,
            Err(source) => {
                report(SinkError::Write {
                    path: path.to_path_buf(),
                    source,
                });
                false
            }
        }
    }

    /// Rotate `path` now, regardless of its size
    ///
    /// Returns `Ok(false)` without touching the archives when `path` does
    /// not exist.
    pub fn force_rotate(&self, path: &Path, policy: RotationPolicy) -> Result<bool, SinkError> {
        let lock = path_lock(path);
        let _guard = lock.lock();

        if !path.exists() {
            return Ok(false);
        }
        policy.rotate(path).map_err(|source| SinkError::Rotation {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(true)
    }
}

/// Process-wide lock for `path`
fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let mut locks = LOCKS.get_or_init(Default::default).lock();
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}

fn append_line(path: &Path, text: &str) -> io::Result<()> {
    let open = || OpenOptions::new().create(true).append(true).open(path);

    let mut file = match open() {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            open()?
        }
        Err(e) => return Err(e),
    };

    let mut buf = String::with_capacity(text.len() + 1);
    buf.push_str(text);
    buf.push('\n');
    file.write_all(buf.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

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

    #[test]
    fn test_console_writes_lines() {
        let capture = Capture::default();
        let console = ConsoleWriter::new(capture.clone());

        console.write_line("one");
        console.write_line("two");

        assert_eq!(String::from_utf8(capture.0.lock().clone()).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_append_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("lab.log");
        let writer = FileWriter::new();

        let ok = writer.append(&path, "hello", RotationPolicy::new(1024, 2), &|e| panic!("{e}"));

        assert!(ok);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_append_rotates_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lab.log");
        fs::write(&path, "0123456789").unwrap();
        let writer = FileWriter::new();

        writer.append(&path, "fresh", RotationPolicy::new(5, 2), &|e| panic!("{e}"));

        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("lab.1.log")).unwrap(),
            "0123456789"
        );
    }

    #[test]
    fn test_append_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending.
        let path = dir.path().to_path_buf();
        let writer = FileWriter::new();
        let reports = RefCell::new(Vec::new());

        let ok = writer.append(&path, "x", RotationPolicy::new(u64::MAX, 2), &|e| {
            reports.borrow_mut().push(e.to_string());
        });

        assert!(!ok);
        let reports = reports.into_inner();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].starts_with("Failed to write to log file"));
    }

    #[test]
    fn test_concurrent_appends_rotate_once_per_overflow() {
        let dir = TempDir::new().unwrap();
        let path = Arc::new(dir.path().join("lab.log"));
        let writer = Arc::new(FileWriter::new());
        let policy = RotationPolicy::new(64, 50);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let path = Arc::clone(&path);
                let writer = Arc::clone(&writer);
                std::thread::spawn(move || {
                    for i in 0..20 {
                        writer.append(&path, &format!("thread {t} line {i:02}"), policy, &|e| {
                            panic!("{e}")
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Every line lands in exactly one file.
        let mut total = fs::read_to_string(&*path).unwrap().lines().count();
        for (_, archive) in crate::rotation::list_archives(&path).unwrap() {
            total += fs::read_to_string(archive).unwrap().lines().count();
        }
        assert_eq!(total, 160);
    }

    #[test]
    fn test_force_rotate_without_active_file_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lab.log");
        fs::write(dir.path().join("lab.1.log"), "one").unwrap();
        fs::write(dir.path().join("lab.2.log"), "two").unwrap();

        let rotated = FileWriter::new().force_rotate(&path, RotationPolicy::new(0, 3)).unwrap();

        assert!(!rotated);
        let left: Vec<usize> = crate::rotation::list_archives(&path)
            .unwrap()
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(left, vec![1, 2]);
        assert_eq!(fs::read_to_string(dir.path().join("lab.1.log")).unwrap(), "one");
    }

    #[test]
    fn test_writers_on_same_path_share_lock() {
        let dir = TempDir::new().unwrap();
        let path = Arc::new(dir.path().join("lab.log"));
        let policy = RotationPolicy::new(64, 60);

        // Each thread has its own writer, as separate loggers would.
        let handles: Vec<_> = (0..6)
            .map(|t| {
                let path = Arc::clone(&path);
                std::thread::spawn(move || {
                    let writer = FileWriter::new();
                    for i in 0..20 {
                        writer.append(&path, &format!("writer {t} line {i:02}"), policy, &|e| {
                            panic!("{e}")
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut total = fs::read_to_string(&*path).unwrap().lines().count();
        for (_, archive) in crate::rotation::list_archives(&path).unwrap() {
            total += fs::read_to_string(archive).unwrap().lines().count();
        }
        assert_eq!(total, 120);
        assert!(Arc::ptr_eq(&path_lock(&path), &path_lock(&path)));
    }
}
