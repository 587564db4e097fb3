use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The two top-level collections held in a [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Chirps,
    Users,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Chirps => write!(f, "chirp"),
            Collection::Users => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: u64,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    // Persisted as `password`; always a one-way hash, never plaintext.
    #[serde(rename = "password")]
    pub password_credential: String,
}

/// The complete persisted state: every chirp and every user, keyed by id.
///
/// A snapshot is always written whole. Keys are the record ids, so the map
/// itself is the primary-key index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub chirps: BTreeMap<u64, Chirp>,
    #[serde(default)]
    pub users: BTreeMap<u64, User>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A record type stored in one of the snapshot's collections.
///
/// Lets the store run its load/mutate/persist cycle without knowing which
/// collection it is touching.
pub trait Record: Clone + Send + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> u64;

    fn collection(snapshot: &Snapshot) -> &BTreeMap<u64, Self>;

    fn collection_mut(snapshot: &mut Snapshot) -> &mut BTreeMap<u64, Self>;
}

impl Record for Chirp {
    const COLLECTION: Collection = Collection::Chirps;

    fn id(&self) -> u64 {
        self.id
    }

    fn collection(snapshot: &Snapshot) -> &BTreeMap<u64, Self> {
        &snapshot.chirps
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut BTreeMap<u64, Self> {
        &mut snapshot.chirps
    }
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> u64 {
        self.id
    }

    fn collection(snapshot: &Snapshot) -> &BTreeMap<u64, Self> {
        &snapshot.users
    }

    fn collection_mut(snapshot: &mut Snapshot) -> &mut BTreeMap<u64, Self> {
        &mut snapshot.users
    }
}
