use crate::error::Result;
use crate::model::Chirp;
use crate::moderation;
use crate::store::{StorageBackend, Store};

pub fn list<B: StorageBackend>(store: &Store<B>) -> Result<Vec<Chirp>> {
    let mut chirps = store.read_all::<Chirp>()?;
    chirps.sort_by_key(|c| c.id);
    Ok(chirps)
}

pub fn get<B: StorageBackend>(store: &Store<B>, id: u64) -> Result<Chirp> {
    store.read_one::<Chirp>(id)
}

/// Validate and mask `body`, then store it as a new chirp.
pub fn create<B: StorageBackend>(store: &Store<B>, body: &str) -> Result<Chirp> {
    let body = moderation::validate_and_clean(body)?;
    store.create(|_| Ok(()), move |id| Chirp { id, body })
}
