//! # Store Lock
//!
//! Exclusive `fs2` lock on `<store path>.lock`, held for the lifetime of a
//! `FileBackedKVStore`. The store caches the whole map in memory, so a
//! second writer on the same file would overwrite committed records.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::domain::errors::KVStoreError;

/// RAII guard; the lock is released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Acquire the lock for the store at `store_path` without blocking.
    ///
    /// ## Errors
    ///
    /// - `Locked`: another handle (in this or another process) holds it
    /// - `IOError`: the lock file could not be created or written
    pub fn acquire(store_path: &Path) -> Result<Self, KVStoreError> {
        let path = sibling_path(store_path, ".lock");

        // No truncate here: the current holder's PID must survive a failed attempt.
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| lock_io_error(&path, e))?;

        if file.try_lock_exclusive().is_err() {
            return Err(KVStoreError::Locked {
                path: path.display().to_string(),
                pid: read_pid(&mut file),
            });
        }

        file.set_len(0).map_err(|e| lock_io_error(&path, e))?;
        file.seek(SeekFrom::Start(0)).map_err(|e| lock_io_error(&path, e))?;
        write!(file, "{}", std::process::id()).map_err(|e| lock_io_error(&path, e))?;
        file.sync_all().map_err(|e| lock_io_error(&path, e))?;

        debug!("[cc-01] Acquired store lock {}", path.display());
        Ok(Self { file, path })
    }

    /// Location of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!("[cc-01] Released store lock {}", self.path.display());
    }
}

/// `<path><suffix>`, keeping any existing extension.
pub(crate) fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn read_pid(file: &mut File) -> Option<u32> {
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    contents.trim().parse().ok()
}

fn lock_io_error(path: &Path, e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: format!("lock file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_is_refused() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("custody.db");

        let held = StoreLock::acquire(&store).unwrap();
        assert_eq!(held.path(), dir.path().join("custody.db.lock"));

        match StoreLock::acquire(&store) {
            Err(KVStoreError::Locked { pid, .. }) => assert_eq!(pid, Some(std::process::id())),
            other => panic!("expected Locked, got {:?}", other),
        }
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("custody.db");

        drop(StoreLock::acquire(&store).unwrap());
        assert!(StoreLock::acquire(&store).is_ok());
    }

    #[test]
    fn test_sibling_path_keeps_extension() {
        assert_eq!(
            sibling_path(Path::new("/data/a.db"), ".tmp"),
            PathBuf::from("/data/a.db.tmp")
        );
        assert_eq!(
            sibling_path(Path::new("a.tmp"), ".tmp"),
            PathBuf::from("a.tmp.tmp")
        );
    }
}
