use super::backend::StorageBackend;
use crate::error::{ChirpyError, Result};
use std::io;

/// In-memory storage backend for testing.
///
/// No interior mutability is needed: writes arrive through `&mut self`,
/// which the store only hands out under its exclusive lock.
#[derive(Debug, Default)]
pub struct MemBackend {
    bytes: Option<Vec<u8>>,
    simulate_write_error: bool,
    saves: usize,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-persisted snapshot.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
            ..Self::default()
        }
    }

    /// Make every `save` fail, leaving the stored bytes untouched.
    pub fn with_write_error(mut self) -> Self {
        self.simulate_write_error = true;
        self
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl StorageBackend for MemBackend {
    fn exists(&self) -> Result<bool> {
        Ok(self.bytes.is_some())
    }

    fn load(&self) -> Result<Vec<u8>> {
        self.bytes.clone().ok_or_else(|| {
            ChirpyError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "no snapshot has been saved",
            ))
        })
    }

    fn save(&mut self, bytes: &[u8]) -> Result<()> {
        if self.simulate_write_error {
            return Err(ChirpyError::Io(io::Error::other("Simulated write error")));
        }
        self.bytes = Some(bytes.to_vec());
        self.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory://database".to_string()
    }
}
