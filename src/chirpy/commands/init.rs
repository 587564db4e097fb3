use crate::error::Result;
use crate::store::{StorageBackend, Store};

/// Ensure a database exists. Returns true if a new, empty one was written.
pub fn run<B: StorageBackend>(store: &Store<B>) -> Result<bool> {
    store.initialize()
}
