use super::backend::{ProcessLock, StorageBackend};
use crate::error::{ChirpyError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Single-file backend. Saves go through a temp file in the same directory
/// which is synced and then renamed over the target.
///
/// Other processes are kept out with an advisory lock on a sidecar
/// `.{file}.lock` next to the database. The database file itself is never
/// locked, since every save replaces it.
pub struct FsBackend {
    path: PathBuf,
}

impl FsBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "database".to_string())
    }

    fn temp_prefix(&self) -> String {
        format!(".{}.", self.file_name())
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir().join(format!(".{}.lock", self.file_name()))
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    fn open_lock_file(&self) -> Result<File> {
        self.ensure_dir(&self.dir())?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.lock_path())?;
        Ok(file)
    }
}

#[derive(Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

fn acquire(file: File, mode: LockMode, timeout: Option<Duration>) -> Result<ProcessLock> {
    let Some(timeout) = timeout else {
        match mode {
            LockMode::Shared => fs2::FileExt::lock_shared(&file)?,
            LockMode::Exclusive => fs2::FileExt::lock_exclusive(&file)?,
        }
        return Ok(ProcessLock::held(file));
    };

    let deadline = Instant::now() + timeout;
    loop {
        let attempt = match mode {
            LockMode::Shared => fs2::FileExt::try_lock_shared(&file),
            LockMode::Exclusive => fs2::FileExt::try_lock_exclusive(&file),
        };
        match attempt {
            Ok(()) => return Ok(ProcessLock::held(file)),
            Err(e) if is_contended(&e) => {
                if Instant::now() >= deadline {
                    return Err(ChirpyError::LockTimeout(timeout));
                }
                thread::sleep(LOCK_POLL_INTERVAL);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

// Makes the rename itself durable. Not every filesystem supports syncing a
// directory handle, so failures are only logged.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        tracing::debug!(dir = %dir.display(), error = %e, "directory sync failed");
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

impl StorageBackend for FsBackend {
    fn exists(&self) -> Result<bool> {
        Ok(self.path.try_exists()?)
    }

    fn load(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    fn save(&mut self, bytes: &[u8]) -> Result<()> {
        let dir = self.dir();
        self.ensure_dir(&dir)?;

        let tmp_path = dir.join(format!("{}{}.tmp", self.temp_prefix(), Uuid::new_v4()));
        let written =
            write_synced(&tmp_path, bytes).and_then(|_| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        sync_dir(&dir);
        Ok(())
    }

    fn sweep_temp_files(&mut self) -> Result<usize> {
        let dir = self.dir();
        if !dir.exists() {
            return Ok(0);
        }

        let prefix = self.temp_prefix();
        let mut removed = 0;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if !(name.starts_with(&prefix) && name.ends_with(".tmp") && path.is_file()) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                // Gone already: some other sweeper got there first.
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }

    fn lock_shared(&self, timeout: Option<Duration>) -> Result<ProcessLock> {
        // Nothing to read yet; the load that follows reports the missing file.
        if !self.dir().exists() {
            return Ok(ProcessLock::unlocked());
        }
        acquire(self.open_lock_file()?, LockMode::Shared, timeout)
    }

    fn lock_exclusive(&self, timeout: Option<Duration>) -> Result<ProcessLock> {
        acquire(self.open_lock_file()?, LockMode::Exclusive, timeout)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut backend = FsBackend::new(dir.path().join("db.json"));

        assert!(!backend.exists().unwrap());
        backend.save(b"{}").unwrap();
        assert!(backend.exists().unwrap());
        assert_eq!(backend.load().unwrap(), b"{}");
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let mut backend = FsBackend::new(dir.path().join("nested").join("db.json"));
        backend.save(b"{}").unwrap();
        assert!(dir.path().join("nested").join("db.json").exists());
    }

    #[test]
    fn test_load_missing_is_io_error() {
        let dir = TempDir::new().unwrap();
        let backend = FsBackend::new(dir.path().join("db.json"));
        assert!(matches!(
            backend.load(),
            Err(ChirpyError::Io(_))
        ));
    }

    #[test]
    fn test_sweep_only_touches_own_temp_files() {
        let dir = TempDir::new().unwrap();
        let mut backend = FsBackend::new(dir.path().join("db.json"));
        backend.save(b"{}").unwrap();

        fs::write(dir.path().join(".db.json.1234.tmp"), b"{\"chir").unwrap();
        fs::write(dir.path().join(".other.json.1234.tmp"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        assert_eq!(backend.sweep_temp_files().unwrap(), 1);
        assert!(!dir.path().join(".db.json.1234.tmp").exists());
        assert!(dir.path().join(".other.json.1234.tmp").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(backend.load().unwrap(), b"{}");
    }

    #[test]
    fn test_relative_path_uses_current_dir() {
        let backend = FsBackend::new("database.json");
        assert_eq!(backend.dir(), PathBuf::from("."));
        assert_eq!(backend.temp_prefix(), ".database.json.");
        assert_eq!(backend.lock_path(), PathBuf::from("./.database.json.lock"));
    }

    #[test]
    fn test_exclusive_lock_excludes_other_handles() {
        let dir = TempDir::new().unwrap();
        let first = FsBackend::new(dir.path().join("db.json"));
        let second = FsBackend::new(dir.path().join("db.json"));
        let wait = Some(Duration::from_millis(20));

        let held = first.lock_exclusive(None).unwrap();
        assert!(held.is_held());
        assert!(dir.path().join(".db.json.lock").exists());
        assert!(matches!(
            second.lock_exclusive(wait),
            Err(ChirpyError::LockTimeout(_))
        ));
        assert!(matches!(
            second.lock_shared(wait),
            Err(ChirpyError::LockTimeout(_))
        ));

        drop(held);
        assert!(second.lock_exclusive(wait).unwrap().is_held());
    }

    #[test]
    fn test_shared_locks_coexist() {
        let dir = TempDir::new().unwrap();
        let first = FsBackend::new(dir.path().join("db.json"));
        let second = FsBackend::new(dir.path().join("db.json"));
        let wait = Some(Duration::from_millis(20));

        let _a = first.lock_shared(None).unwrap();
        let _b = second.lock_shared(wait).unwrap();
        assert!(matches!(
            second.lock_exclusive(wait),
            Err(ChirpyError::LockTimeout(_))
        ));
    }

    #[test]
    fn test_shared_lock_on_missing_dir_is_noop() {
        let dir = TempDir::new().unwrap();
        let backend = FsBackend::new(dir.path().join("absent").join("db.json"));
        assert!(!backend.lock_shared(None).unwrap().is_held());
        assert!(!dir.path().join("absent").exists());
    }

    #[test]
    fn test_sweep_leaves_lock_file() {
        let dir = TempDir::new().unwrap();
        let mut backend = FsBackend::new(dir.path().join("db.json"));
        let _lock = backend.lock_exclusive(None).unwrap();
        backend.save(b"{}").unwrap();

        assert_eq!(backend.sweep_temp_files().unwrap(), 0);
        assert!(backend.lock_path().exists());
    }
}
