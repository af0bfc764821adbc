//! # Append-only file sink with reopen-for-rotation.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::LogSink;

/// File-backed [`LogSink`].
///
/// `reopen` opens the configured path again and swaps the handle in place,
/// which is how external log rotation is honored: rename the file, deliver
/// the reload/restart signal, and new lines land in a fresh file at the
/// original path.
///
/// Writes go straight to the file descriptor (no userspace buffer), so a
/// line accepted before a reopen is already on disk when the swap happens.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Opens (or creates) the file at `path` in append mode.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = Self::open_file(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// The path this sink appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_file(path: &Path) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path)
    }
}

impl LogSink for FileSink {
    fn write(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")
    }

    fn reopen(&self) -> io::Result<()> {
        // Open first, swap second: a failed open leaves the old handle
        // untouched and the sink keeps writing to it.
        let fresh = Self::open_file(&self.path)?;
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        *file = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_write_appends_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("server.log");
        let sink = FileSink::open(&path).expect("open");

        sink.write("first").expect("write");
        sink.write("second").expect("write");

        assert_eq!(read_lines(&path), vec!["first", "second"]);
    }

    #[test]
    fn test_reopen_follows_rotation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("server.log");
        let rotated = dir.path().join("server.log.1");
        let sink = FileSink::open(&path).expect("open");

        sink.write("before rotation").expect("write");
        std::fs::rename(&path, &rotated).expect("rename");
        sink.reopen().expect("reopen");
        sink.write("after rotation").expect("write");

        assert_eq!(read_lines(&rotated), vec!["before rotation"]);
        assert_eq!(read_lines(&path), vec!["after rotation"]);
    }

    #[test]
    fn test_failed_reopen_keeps_old_handle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("logs");
        std::fs::create_dir(&nested).expect("mkdir");
        let path = nested.join("server.log");
        let sink = FileSink::open(&path).expect("open");

        sink.write("one").expect("write");
        std::fs::remove_file(&path).expect("rm");
        std::fs::remove_dir(&nested).expect("rmdir");

        assert!(sink.reopen().is_err(), "reopen into missing dir must fail");
        // The previous descriptor is still valid even though the path is gone.
        sink.write("two").expect("write after failed reopen");
    }
}
