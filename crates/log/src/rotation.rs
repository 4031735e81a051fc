//! Size-based rotation of the active log file
//!
//! Archives sit next to the active file with a numeric suffix before the
//! extension: `lab.log` rotates to `lab.1.log`, the previous `lab.1.log`
//! moves to `lab.2.log`, and so on up to `max_files`. Anything numbered
//! above `max_files` is deleted after the shift.
//!
//! Gaps are not compacted: when `lab.2.log` is missing nothing moves into
//! `lab.3.log`, so the gap travels up with each shift. Retention is therefore
//! "no archive numbered above `max_files` survives", not "exactly the newest
//! N files".

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// When to rotate and how many archives to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate once the active file is larger than this
    pub max_bytes: u64,
    /// Number of numbered archives to keep
    pub max_files: usize,
}

impl RotationPolicy {
    /// Create a policy
    pub const fn new(max_bytes: u64, max_files: usize) -> Self {
        Self {
            max_bytes,
            max_files,
        }
    }

    /// Whether `path` has grown past the size limit
    ///
    /// A missing file never needs rotation.
    pub fn needs_rotation(&self, path: &Path) -> io::Result<bool> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.len() > self.max_bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Rotate `path` if it is over the limit; returns whether it rotated
    pub fn rotate_if_needed(&self, path: &Path) -> io::Result<bool> {
        if self.needs_rotation(path)? {
            self.rotate(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Shift archives, move the active file to `.1` and prune
    ///
    /// Callers must hold the file lock for the whole call.
    pub fn rotate(&self, path: &Path) -> io::Result<()> {
        for i in (2..=self.max_files).rev() {
            let from = archive_path(path, i - 1);
            if from.exists() {
                fs::rename(&from, archive_path(path, i))?;
            }
        }

        if path.exists() {
            fs::rename(path, archive_path(path, 1))?;
        }

        self.prune(path)
    }

    /// Delete numbered siblings of `path` whose suffix exceeds `max_files`
    pub fn prune(&self, path: &Path) -> io::Result<()> {
        for (index, archive) in list_archives(path)? {
            if index > self.max_files {
                match fs::remove_file(&archive) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }
}

/// `dir/name.ext` -> `dir/name.{index}.ext`; `dir/name` -> `dir/name.{index}`
pub fn archive_path(path: &Path, index: usize) -> PathBuf {
    let (stem, ext) = split_name(path);
    let name = match ext {
        Some(ext) => format!("{stem}.{index}.{ext}"),
        None => format!("{stem}.{index}"),
    };
    path.with_file_name(name)
}

/// Numbered archives of `path` present on disk, sorted by index
pub fn list_archives(path: &Path) -> io::Result<Vec<(usize, PathBuf)>> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let (stem, ext) = split_name(path);
    let prefix = format!("{stem}.");
    let suffix = ext.map(|e| format!(".{e}")).unwrap_or_default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut archives = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let index = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(suffix.as_str()))
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse::<usize>().ok());
        if let Some(index) = index {
            archives.push((index, entry.path()));
        }
    }
    archives.sort_by_key(|(index, _)| *index);
    Ok(archives)
}

fn split_name(path: &Path) -> (String, Option<String>) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    (stem, ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::write(path, content).unwrap();
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_archive_path() {
        assert_eq!(
            archive_path(Path::new("/var/log/lab.log"), 3),
            PathBuf::from("/var/log/lab.3.log")
        );
        assert_eq!(archive_path(Path::new("lab"), 1), PathBuf::from("lab.1"));
        assert_eq!(
            archive_path(Path::new("logs/lab.run.txt"), 2),
            PathBuf::from("logs/lab.run.2.txt")
        );
    }

    #[test]
    fn test_missing_file_does_not_rotate() {
        let dir = TempDir::new().unwrap();
        let policy = RotationPolicy::new(0, 3);
        assert!(!policy.rotate_if_needed(&dir.path().join("none.log")).unwrap());
    }

    #[test]
    fn test_rotation_only_when_exceeding() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("lab.log");
        write(&log, "12345");

        assert!(!RotationPolicy::new(5, 3).rotate_if_needed(&log).unwrap());
        assert!(RotationPolicy::new(4, 3).rotate_if_needed(&log).unwrap());
        assert!(!log.exists());
        assert_eq!(read(&archive_path(&log, 1)), "12345");
    }

    #[test]
    fn test_shift_order() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("lab.log");
        let policy = RotationPolicy::new(0, 3);

        for generation in ["first", "second", "third"] {
            write(&log, generation);
            policy.rotate(&log).unwrap();
        }

        assert_eq!(read(&archive_path(&log, 1)), "third");
        assert_eq!(read(&archive_path(&log, 2)), "second");
        assert_eq!(read(&archive_path(&log, 3)), "first");
    }

    #[test]
    fn test_retention_bound_after_many_rotations() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("lab.log");
        let policy = RotationPolicy::new(1, 3);

        for i in 0..(policy.max_files + 5) {
            write(&log, &format!("generation {i}"));
            assert!(policy.rotate_if_needed(&log).unwrap());
        }

        let archives = list_archives(&log).unwrap();
        assert!(archives.len() <= policy.max_files);
        assert_eq!(read(&archive_path(&log, 1)), "generation 7");
    }

    #[test]
    fn test_prune_removes_out_of_range_archives() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("lab.log");
        for i in [1, 2, 5, 12] {
            write(&archive_path(&log, i), "old");
        }
        write(&dir.path().join("lab.backup.log"), "unrelated");

        RotationPolicy::new(0, 2).prune(&log).unwrap();

        let left: Vec<usize> = list_archives(&log).unwrap().into_iter().map(|(i, _)| i).collect();
        assert_eq!(left, vec![1, 2]);
        assert!(dir.path().join("lab.backup.log").exists());
    }

    #[test]
    fn test_gaps_are_shifted_as_is() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("lab.log");
        write(&log, "current");
        write(&archive_path(&log, 1), "one");
        write(&archive_path(&log, 3), "three");

        RotationPolicy::new(0, 4).rotate(&log).unwrap();

        // 3 -> 4, the missing 2 leaves nothing to move into 3, 1 -> 2, current -> 1
        assert_eq!(read(&archive_path(&log, 1)), "current");
        assert_eq!(read(&archive_path(&log, 2)), "one");
        assert!(!archive_path(&log, 3).exists());
        assert_eq!(read(&archive_path(&log, 4)), "three");
    }

    #[test]
    fn test_zero_retention_keeps_no_archives() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("lab.log");
        write(&log, "data");

        RotationPolicy::new(0, 0).rotate(&log).unwrap();

        assert!(!log.exists());
        assert!(list_archives(&log).unwrap().is_empty());
    }
}
