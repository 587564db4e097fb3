use crate::error::Result;
use std::fs::File;
use std::time::Duration;

/// Abstract interface for raw snapshot I/O.
///
/// A backend only moves bytes; encoding, in-process locking and id
/// assignment live in [`Store`](super::Store). Reads take `&self`, writes
/// take `&mut self`, so a backend wrapped in the store's lock can only be
/// written through the exclusive guard.
///
/// Backends whose storage can be reached by other processes also provide the
/// cross-process half of the lock through [`lock_shared`](Self::lock_shared)
/// and [`lock_exclusive`](Self::lock_exclusive). The store takes these after
/// its own guard and holds them for the whole operation.
pub trait StorageBackend: Send + Sync {
    /// Whether a persisted snapshot exists yet.
    fn exists(&self) -> Result<bool>;

    /// Read the persisted snapshot bytes.
    /// A missing snapshot is an error here; only initialization treats it as valid.
    fn load(&self) -> Result<Vec<u8>>;

    /// Replace the persisted snapshot.
    /// MUST be atomic: readers see either the old bytes or the new ones, never a mix.
    fn save(&mut self, bytes: &[u8]) -> Result<()>;

    /// Remove leftovers of interrupted saves. Returns how many were removed.
    /// Only called while the exclusive cross-process lock is held.
    fn sweep_temp_files(&mut self) -> Result<usize> {
        Ok(0)
    }

    /// Shared lock against other processes, held for a read.
    fn lock_shared(&self, _timeout: Option<Duration>) -> Result<ProcessLock> {
        Ok(ProcessLock::unlocked())
    }

    /// Exclusive lock against other processes, held for a load→persist cycle.
    fn lock_exclusive(&self, _timeout: Option<Duration>) -> Result<ProcessLock> {
        Ok(ProcessLock::unlocked())
    }

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// A held cross-process lock. Released on drop.
#[derive(Debug)]
pub struct ProcessLock {
    file: Option<File>,
}

impl ProcessLock {
    /// For backends no other process can reach.
    pub fn unlocked() -> Self {
        Self { file: None }
    }

    /// Wrap a file that already carries an advisory lock.
    pub fn held(file: File) -> Self {
        Self { file: Some(file) }
    }

    #[cfg(test)]
    pub(crate) fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for ProcessLock {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            // Closing the handle releases the lock too; unlocking first keeps
            // the release independent of when the handle is actually closed.
            let _ = fs2::FileExt::unlock(file);
        }
    }
}
