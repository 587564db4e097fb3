//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for every chirpy operation, whichever front end is calling
//! (the bundled CLI, an HTTP server, tests).
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** to the appropriate command function
//! - **Owns the store**, and with it the database lock
//! - **Returns typed results** (`Result<Chirp>`, `Result<Vec<User>>`, ...)
//!
//! It does no formatting and no I/O of its own beyond what the store does.
//!
//! ## Sharing
//!
//! Every method takes `&self`. Concurrency control lives inside the store, so
//! one `ChirpyApi` wrapped in an `Arc` can serve any number of threads.
//! Separate instances on the same file (other threads, other processes)
//! serialize through the backend's file lock instead.

use crate::commands;
use crate::credential::CredentialHasher;
use crate::error::Result;
use crate::model::{Chirp, User};
use crate::store::fs::FsBackend;
use crate::store::{StorageBackend, Store, StoreOptions};
use std::path::PathBuf;

pub struct ChirpyApi<B: StorageBackend> {
    store: Store<B>,
}

impl ChirpyApi<FsBackend> {
    /// Open the database at `path`, creating an empty one if it is missing.
    pub fn open(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self> {
        let api = Self::new(Store::with_options(FsBackend::new(path), options));
        api.initialize()?;
        Ok(api)
    }
}

impl<B: StorageBackend> ChirpyApi<B> {
    pub fn new(store: Store<B>) -> Self {
        Self { store }
    }

    pub fn initialize(&self) -> Result<bool> {
        commands::init::run(&self.store)
    }

    pub fn create_chirp(&self, body: &str) -> Result<Chirp> {
        commands::chirps::create(&self.store, body)
    }

    pub fn get_chirp(&self, id: u64) -> Result<Chirp> {
        commands::chirps::get(&self.store, id)
    }

    pub fn get_chirps(&self) -> Result<Vec<Chirp>> {
        commands::chirps::list(&self.store)
    }

    /// Store a user with an already-hashed credential.
    pub fn create_user(&self, email: &str, credential: &str) -> Result<User> {
        commands::users::create(&self.store, email, credential)
    }

    pub fn get_users(&self) -> Result<Vec<User>> {
        commands::users::list(&self.store)
    }

    pub fn register_user<H: CredentialHasher + ?Sized>(
        &self,
        hasher: &H,
        email: &str,
        password: &str,
    ) -> Result<User> {
        commands::users::register(&self.store, hasher, email, password)
    }

    pub fn login<H: CredentialHasher + ?Sized>(
        &self,
        hasher: &H,
        email: &str,
        password: &str,
    ) -> Result<User> {
        commands::users::login(&self.store, hasher, email, password)
    }
}
