use crate::credential::CredentialHasher;
use crate::error::Result;
use crate::store::memory::MemBackend;
use crate::store::Store;

pub struct TestEnv {
    pub store: Store<MemBackend>,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let store = Store::new(MemBackend::new());
        store.initialize().expect("failed to initialize memory store");
        Self { store }
    }
}

/// Cheap stand-in for Argon2 so command tests stay fast.
pub struct ReversingHasher;

impl CredentialHasher for ReversingHasher {
    fn hash(&self, plaintext: &str) -> Result<String> {
        Ok(plaintext.chars().rev().collect())
    }

    fn verify(&self, hashed: &str, plaintext: &str) -> bool {
        hashed.chars().rev().eq(plaintext.chars())
    }
}
