//! Per-namespace run lock.
//!
//! The state file of a namespace is not safe for concurrent writers. A run
//! holds an advisory lock on `<state_root>/<namespace>/.lock` for its whole
//! duration; a second run on the same namespace fails fast instead of waiting.

use std::path::{Path, PathBuf};

use fslock::LockFile;

use crate::error::LockError;

/// Lock file name inside a namespace directory.
pub const LOCK_FILE: &str = ".lock";

/// RAII guard for a namespace lock. Released on drop.
#[derive(Debug)]
pub struct NamespaceLock {
    _lock: LockFile,
    path: PathBuf,
}

impl NamespaceLock {
    /// Try to take the lock for the namespace directory `dir`, creating it if needed.
    pub fn acquire(dir: &Path) -> Result<Self, LockError> {
        let path = dir.join(LOCK_FILE);

        std::fs::create_dir_all(dir).map_err(|source| LockError::Open {
            path: path.clone(),
            source,
        })?;

        let mut lock = LockFile::open(&path).map_err(|source| LockError::Open {
            path: path.clone(),
            source,
        })?;

        let acquired = lock.try_lock().map_err(|source| LockError::Open {
            path: path.clone(),
            source,
        })?;
        if !acquired {
            return Err(LockError::Locked { path });
        }

        tracing::debug!("Locked {}", path.display());
        Ok(Self { _lock: lock, path })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn second_acquire_fails_while_held() {
        let dir = tempdir().unwrap();
        let ns_dir = dir.path().join("rinkeby");

        let first = NamespaceLock::acquire(&ns_dir).unwrap();
        assert!(first.path().exists());

        let second = NamespaceLock::acquire(&ns_dir);
        assert!(matches!(second, Err(LockError::Locked { .. })));

        drop(first);
        assert!(NamespaceLock::acquire(&ns_dir).is_ok());
    }

    #[test]
    fn different_namespaces_do_not_conflict() {
        let dir = tempdir().unwrap();

        let _a = NamespaceLock::acquire(&dir.path().join("a")).unwrap();
        let _b = NamespaceLock::acquire(&dir.path().join("b")).unwrap();
    }
}
