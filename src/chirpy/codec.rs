//! # Record Codec
//!
//! Turns a [`Snapshot`] into the bytes stored on disk and back. The format is
//! JSON with two top-level maps keyed by decimal id:
//!
//! ```text
//! {
//!   "chirps": { "1": { "id": 1, "body": "hello" } },
//!   "users":  { "1": { "id": 1, "email": "a@x.com", "password": "$argon2id$..." } }
//! }
//! ```
//!
//! Decoding checks more than syntax: a record whose `id` disagrees with its
//! map key is rejected, since the store relies on the key being the id.

use crate::error::{ChirpyError, Result};
use crate::model::{Chirp, Record, Snapshot, User};
use serde::{Deserialize, Serialize};

/// How snapshots are laid out on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Pretty,
    Compact,
}

pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>> {
    encode_with(snapshot, Encoding::default())
}

pub fn encode_with(snapshot: &Snapshot, encoding: Encoding) -> Result<Vec<u8>> {
    let bytes = match encoding {
        Encoding::Pretty => serde_json::to_vec_pretty(snapshot)?,
        Encoding::Compact => serde_json::to_vec(snapshot)?,
    };
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<Snapshot> {
    let snapshot: Snapshot = serde_json::from_slice(bytes)?;
    check_keys::<Chirp>(&snapshot)?;
    check_keys::<User>(&snapshot)?;
    Ok(snapshot)
}

fn check_keys<R: Record>(snapshot: &Snapshot) -> Result<()> {
    for (key, record) in R::collection(snapshot) {
        if *key != record.id() {
            return Err(ChirpyError::Corrupt(format!(
                "{} stored under key {} has id {}",
                R::COLLECTION,
                key,
                record.id()
            )));
        }
    }
    Ok(())
}
