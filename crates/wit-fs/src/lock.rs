//! Advisory file locks with a bounded wait.

use crate::error::{FsError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// RAII guard for an exclusive lock on a lock file. Released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock, polling until `timeout` elapses.
    ///
    /// # Errors
    /// Returns `FsError::LockTimeout` if the lock stays held, or an IO error
    /// if the lock file cannot be opened.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        let parent = path.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "lock path has no parent")
        })?;
        fs::create_dir_all(parent)?;

        let start = Instant::now();
        loop {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(path)?;

            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!(path = %path.display(), "Acquired lock");
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(err) if !is_contended(&err) => return Err(err.into()),
                Err(_) => {}
            }

            if start.elapsed() >= timeout {
                return Err(FsError::LockTimeout {
                    path: path.to_path_buf(),
                    waited: start.elapsed(),
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Return the lock file path.
    #[cfg(test)]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Whether a failed `try_lock` means another holder rather than an IO fault.
fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!(path = %self.path.display(), "Released lock");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_times_out() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/item.lock");

        let held = FileLock::acquire(&path, Duration::from_millis(50)).unwrap();
        assert_eq!(held.path(), path);

        let err = FileLock::acquire(&path, Duration::from_millis(30)).unwrap_err();
        assert!(matches!(err, FsError::LockTimeout { .. }));

        drop(held);
        assert!(FileLock::acquire(&path, Duration::from_millis(50)).is_ok());
    }

    #[test]
    fn test_contention_is_recognized() {
        assert!(is_contended(&fs2::lock_contended_error()));
        assert!(!is_contended(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }

    #[test]
    fn test_io_failure_is_not_reported_as_timeout() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let started = Instant::now();
        let err = FileLock::acquire(&blocker.join("item.lock"), Duration::from_secs(5)).unwrap_err();

        assert!(matches!(err, FsError::Io(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
