//! # Command Layer
//!
//! Typed operations over the two collections. Each function takes the store
//! explicitly and performs exactly one store call, so every command is a
//! single load → mutate → persist (or load → read) cycle.
//!
//! - [`chirps`]: list, get and create chirps (creation runs moderation first)
//! - [`users`]: list and create users (email must be unique), login
//! - [`init`]: make sure a database exists

pub mod chirps;
pub mod init;
pub mod users;
