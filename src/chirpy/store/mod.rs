//! # Storage Layer
//!
//! The store owns the database file. Every public operation runs a full
//! **load → mutate → persist** cycle; nothing is cached between calls, so the
//! file on disk is always the single source of truth.
//!
//! ## Layers
//!
//! - [`StorageBackend`]: raw bytes in, raw bytes out.
//!   - [`fs::FsBackend`]: production, one JSON file replaced atomically.
//!   - [`memory::MemBackend`]: tests, no filesystem.
//! - [`Store`]: generic over the backend. Decodes and encodes snapshots
//!   through [`codec`](crate::codec), assigns ids, runs uniqueness checks and
//!   owns the lock.
//!
//! ## Locking
//!
//! The backend lives inside one `parking_lot::RwLock` per store:
//!
//! - `read_all` / `read_one` / `read_snapshot` hold the shared guard.
//! - `create` and `initialize` hold the exclusive guard for the entire cycle,
//!   so two creates can never compute the same next id and no reader sees a
//!   snapshot between another writer's load and persist.
//!
//! Persisting needs `&mut B`, which is only reachable through the exclusive
//! guard. Guards drop on every exit path, errors included.
//!
//! The `RwLock` only orders threads sharing one `Store`. Under it, each
//! operation also takes the backend's cross-process lock in the same mode
//! ([`StorageBackend::lock_shared`] / [`StorageBackend::lock_exclusive`]), so
//! separate stores on one file, in this process or another, serialize too.
//! Both honor `lock_timeout`.
//!
//! ## Identifiers
//!
//! The next id of a collection is its cardinality plus one. Records are never
//! deleted, so this is also one past the largest key. If a hand-edited file
//! breaks that assumption the store falls back to the largest key plus one
//! rather than overwrite a record.

use crate::codec::{self, Encoding};
use crate::error::{ChirpyError, Result};
use crate::model::{Record, Snapshot};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

pub mod backend;
pub mod fs;
pub mod memory;

pub use backend::{ProcessLock, StorageBackend};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Upper bound on waiting for the lock. `None` waits as long as it takes.
    pub lock_timeout: Option<Duration>,
    pub encoding: Encoding,
}

pub struct Store<B: StorageBackend> {
    backend: RwLock<B>,
    options: StoreOptions,
}

impl<B: StorageBackend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, StoreOptions::default())
    }

    pub fn with_options(backend: B, options: StoreOptions) -> Self {
        Self {
            backend: RwLock::new(backend),
            options,
        }
    }

    #[cfg(test)]
    fn with_backend<T>(&self, f: impl FnOnce(&B) -> T) -> Result<T> {
        let guard = self.read_guard()?;
        Ok(f(&*guard))
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, B>> {
        match self.options.lock_timeout {
            Some(timeout) => self
                .backend
                .try_read_for(timeout)
                .ok_or(ChirpyError::LockTimeout(timeout)),
            None => Ok(self.backend.read()),
        }
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, B>> {
        match self.options.lock_timeout {
            Some(timeout) => self
                .backend
                .try_write_for(timeout)
                .ok_or(ChirpyError::LockTimeout(timeout)),
            None => Ok(self.backend.write()),
        }
    }

    /// Persist an empty snapshot if none exists yet. Returns true if it did.
    ///
    /// Calling this on an existing database never changes its contents; it
    /// only clears temp files an interrupted save may have left behind.
    pub fn initialize(&self) -> Result<bool> {
        let mut backend = self.write_guard()?;
        let _process = backend.lock_exclusive(self.options.lock_timeout)?;

        let swept = backend.sweep_temp_files()?;
        if swept > 0 {
            warn!(
                location = %backend.describe(),
                count = swept,
                "removed temp files left by an interrupted save"
            );
        }

        if backend.exists()? {
            debug!(location = %backend.describe(), "database already present");
            return Ok(false);
        }

        persist(&mut *backend, &Snapshot::new(), self.options.encoding)?;
        info!(location = %backend.describe(), "created empty database");
        Ok(true)
    }

    pub fn read_snapshot(&self) -> Result<Snapshot> {
        let backend = self.read_guard()?;
        let _process = backend.lock_shared(self.options.lock_timeout)?;
        load(&*backend)
    }

    /// All records of one collection, ascending by id.
    pub fn read_all<R: Record>(&self) -> Result<Vec<R>> {
        let mut snapshot = self.read_snapshot()?;
        let records = std::mem::take(R::collection_mut(&mut snapshot));
        Ok(records.into_values().collect())
    }

    pub fn read_one<R: Record>(&self, id: u64) -> Result<R> {
        let mut snapshot = self.read_snapshot()?;
        R::collection_mut(&mut snapshot)
            .remove(&id)
            .ok_or(ChirpyError::NotFound {
                collection: R::COLLECTION,
                id,
            })
    }

    /// Insert a new record built by `build` from the next free id.
    ///
    /// `check` sees the collection as freshly loaded under the exclusive lock
    /// and can veto the insert (uniqueness constraints). The record is only
    /// returned once the new snapshot has been persisted.
    pub fn create<R, C, F>(&self, check: C, build: F) -> Result<R>
    where
        R: Record,
        C: FnOnce(&BTreeMap<u64, R>) -> Result<()>,
        F: FnOnce(u64) -> R,
    {
        let mut backend = self.write_guard()?;
        let _process = backend.lock_exclusive(self.options.lock_timeout)?;
        let mut snapshot = load(&*backend)?;

        let collection = R::collection_mut(&mut snapshot);
        check(&*collection)?;

        let id = next_id(collection)?;
        let record = build(id);
        debug_assert_eq!(record.id(), id, "record built with a foreign id");
        collection.insert(id, record.clone());

        persist(&mut *backend, &snapshot, self.options.encoding)?;
        debug!(collection = %R::COLLECTION, id, "created record");
        Ok(record)
    }
}

fn load<B: StorageBackend>(backend: &B) -> Result<Snapshot> {
    let bytes = backend.load()?;
    debug!(location = %backend.describe(), bytes = bytes.len(), "loaded snapshot");
    codec::decode(&bytes)
}

fn persist<B: StorageBackend>(
    backend: &mut B,
    snapshot: &Snapshot,
    encoding: Encoding,
) -> Result<()> {
    let bytes = codec::encode_with(snapshot, encoding)?;
    backend.save(&bytes)?;
    debug!(location = %backend.describe(), bytes = bytes.len(), "persisted snapshot");
    Ok(())
}

fn next_id<R>(collection: &BTreeMap<u64, R>) -> Result<u64> {
    let candidate = collection.len() as u64 + 1;
    if !collection.contains_key(&candidate) {
        return Ok(candidate);
    }
    let max = collection.keys().next_back().copied().unwrap_or(0);
    let fallback = max
        .checked_add(1)
        .ok_or_else(|| ChirpyError::Corrupt(format!("id space exhausted (largest id {max})")))?;
    warn!(candidate, fallback, "id sequence has gaps, using largest id + 1");
    Ok(fallback)
}

#[cfg(test)]
mod tests {
    use super::memory::MemBackend;
    use super::*;
    use crate::model::{Chirp, Collection, User};

    fn empty_store() -> Store<MemBackend> {
        let store = Store::new(MemBackend::new());
        store.initialize().unwrap();
        store
    }

    fn add_chirp(store: &Store<MemBackend>, body: &str) -> Chirp {
        store
            .create(|_| Ok(()), |id| Chirp {
                id,
                body: body.to_string(),
            })
            .unwrap()
    }

    #[test]
    fn test_initialize_creates_empty_snapshot_once() {
        let store = Store::new(MemBackend::new());
        assert!(store.initialize().unwrap());
        assert!(!store.initialize().unwrap());

        assert_eq!(store.read_snapshot().unwrap(), Snapshot::new());
        assert_eq!(store.with_backend(|b| b.save_count()).unwrap(), 1);
    }

    #[test]
    fn test_initialize_keeps_existing_contents() {
        let raw = br#"{"chirps":{"1":{"id":1,"body":"kept"}},"users":{}}"#;
        let store = Store::new(MemBackend::with_bytes(raw.to_vec()));

        assert!(!store.initialize().unwrap());
        assert!(!store.initialize().unwrap());
        assert_eq!(store.read_one::<Chirp>(1).unwrap().body, "kept");
        assert_eq!(store.with_backend(|b| b.save_count()).unwrap(), 0);
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let store = empty_store();
        let ids: Vec<u64> = (0..5).map(|i| add_chirp(&store, &format!("c{i}")).id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let all: Vec<u64> = store.read_all::<Chirp>().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(all, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_collections_number_independently() {
        let store = empty_store();
        add_chirp(&store, "one");
        add_chirp(&store, "two");
        let user = store
            .create(|_| Ok(()), |id| User {
                id,
                email: "a@x.com".into(),
                password_credential: "h".into(),
            })
            .unwrap();
        assert_eq!(user.id, 1);
    }

    #[test]
    fn test_read_on_empty_store() {
        let store = empty_store();
        assert!(store.read_all::<Chirp>().unwrap().is_empty());
        assert!(store.read_all::<User>().unwrap().is_empty());
        assert!(matches!(
            store.read_one::<Chirp>(1),
            Err(ChirpyError::NotFound {
                collection: Collection::Chirps,
                id: 1
            })
        ));
    }

    #[test]
    fn test_read_before_initialize_is_io_error() {
        let store = Store::new(MemBackend::new());
        assert!(matches!(
            store.read_all::<Chirp>(),
            Err(ChirpyError::Io(_))
        ));
    }

    #[test]
    fn test_check_vetoes_insert() {
        let store = empty_store();
        add_chirp(&store, "existing");

        let result = store.create::<Chirp, _, _>(
            |chirps| {
                assert_eq!(chirps.len(), 1);
                Err(ChirpyError::Conflict("no".into()))
            },
            |_| panic!("must not build after a failed check"),
        );
        assert!(matches!(result, Err(ChirpyError::Conflict(_))));
        assert_eq!(store.read_all::<Chirp>().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_persist_leaves_snapshot_unchanged() {
        let raw = br#"{"chirps":{"1":{"id":1,"body":"before"}},"users":{}}"#;
        let store = Store::new(MemBackend::with_bytes(raw.to_vec()).with_write_error());

        let result = store.create(|_| Ok(()), |id| Chirp {
            id,
            body: "after".into(),
        });
        assert!(matches!(result, Err(ChirpyError::Io(_))));

        let chirps = store.read_all::<Chirp>().unwrap();
        assert_eq!(chirps.len(), 1);
        assert_eq!(chirps[0].body, "before");
    }

    #[test]
    fn test_corrupt_file_surfaces_format_error() {
        let store = Store::new(MemBackend::with_bytes(b"{\"chirps\": {".to_vec()));
        assert!(!store.initialize().unwrap());
        assert!(matches!(store.read_all::<Chirp>(), Err(ChirpyError::Format(_))));
        assert!(matches!(
            store.create(|_| Ok(()), |id| Chirp { id, body: "x".into() }),
            Err(ChirpyError::Format(_))
        ));
    }

    #[test]
    fn test_next_id_skips_occupied_key() {
        // Two chirps under keys 1 and 3, so len + 1 is already taken.
        let raw = br#"{"chirps":{"1":{"id":1,"body":"a"},"3":{"id":3,"body":"c"}},"users":{}}"#;
        let store = Store::new(MemBackend::with_bytes(raw.to_vec()));

        let created = add_chirp(&store, "d");
        assert_eq!(created.id, 4);
        assert_eq!(store.read_one::<Chirp>(3).unwrap().body, "c");
    }

    #[test]
    fn test_next_id_refuses_to_wrap() {
        let raw = br#"{"chirps":{"3":{"id":3,"body":"c"},"18446744073709551615":{"id":18446744073709551615,"body":"max"}},"users":{}}"#;
        let store = Store::new(MemBackend::with_bytes(raw.to_vec()));

        let result = store.create(|_| Ok(()), |id| Chirp { id, body: "x".into() });
        assert!(matches!(result, Err(ChirpyError::Corrupt(_))));
        assert_eq!(store.read_all::<Chirp>().unwrap().len(), 2);
        assert_eq!(store.with_backend(|b| b.save_count()).unwrap(), 0);
    }

    #[test]
    fn test_lock_timeout_when_writer_holds_lock() {
        let store = Store::with_options(
            MemBackend::new(),
            StoreOptions {
                lock_timeout: Some(Duration::from_millis(20)),
                ..StoreOptions::default()
            },
        );
        store.initialize().unwrap();

        let _held = store.backend.write();
        assert!(matches!(
            store.read_all::<Chirp>(),
            Err(ChirpyError::LockTimeout(_))
        ));
        assert!(matches!(
            store.create(|_| Ok(()), |id| Chirp { id, body: "x".into() }),
            Err(ChirpyError::LockTimeout(_))
        ));
    }

    #[test]
    fn test_readers_share_the_lock() {
        let store = Store::with_options(
            MemBackend::new(),
            StoreOptions {
                lock_timeout: Some(Duration::from_millis(20)),
                ..StoreOptions::default()
            },
        );
        store.initialize().unwrap();

        let _reader = store.backend.read();
        assert!(store.read_all::<Chirp>().unwrap().is_empty());
        assert!(matches!(
            store.create(|_| Ok(()), |id| Chirp { id, body: "x".into() }),
            Err(ChirpyError::LockTimeout(_))
        ));
    }

    #[test]
    fn test_lock_released_after_error() {
        let store = Store::new(MemBackend::new().with_write_error());
        assert!(store.initialize().is_err());
        // A leaked guard would deadlock here.
        assert!(!store.with_backend(|b| b.exists().unwrap()).unwrap());
    }
}
