//! # Chirpy Architecture
//!
//! Chirpy is the persistence layer of a small social-post service: one JSON
//! file holding two collections, chirps and users, shared by many concurrent
//! callers. It is a library first; the bundled binary is one client of it, an
//! HTTP server would be another.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, hashes passwords, prints results       │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, shareable across threads      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs, moderation.rs)               │
//! │  - Validation, masking, uniqueness rules, login             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/, codec.rs)                           │
//! │  - Load → mutate → persist under RwLock + file lock         │
//! │  - FsBackend (atomic replace), MemBackend (testing)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Ids within a collection are `1..=N` with no duplicates, also under
//!   concurrent creates: the next id is computed inside the same exclusive
//!   section as the insert and the persist.
//! - No two users share an email (exact match).
//! - The database file is always either the previous snapshot or the new
//!   one, never a partial write.
//! - A create that fails to persist returns an error and changes nothing.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Collection accessors
//! - [`store`]: Locking, id assignment and storage backends
//! - [`codec`]: Snapshot encoding
//! - [`model`]: `Chirp`, `User`, `Snapshot`
//! - [`moderation`]: Length validation and word masking
//! - [`credential`]: Password hashing
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod codec;
pub mod commands;
pub mod config;
pub mod credential;
pub mod error;
pub mod model;
pub mod moderation;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;
