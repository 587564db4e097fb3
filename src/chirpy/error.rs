use crate::model::Collection;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChirpyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Corrupt database: {0}")]
    Corrupt(String),

    #[error("{collection} not found: {id}")]
    NotFound { collection: Collection, id: u64 },

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Chirp is too long ({len} characters, max {max})")]
    TooLong { len: usize, max: usize },

    #[error("Incorrect password")]
    InvalidCredentials,

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Timed out after {0:?} waiting for the database lock")]
    LockTimeout(Duration),

    #[error("Config error: {0}")]
    Config(String),
}

impl ChirpyError {
    /// The client-visible outcome of this error, expressed as an HTTP status.
    ///
    /// Expected outcomes (bad input, missing records, conflicts) map to 4xx;
    /// everything that means the store itself failed maps to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            ChirpyError::TooLong { .. } => 400,
            ChirpyError::InvalidCredentials => 401,
            ChirpyError::NotFound { .. } | ChirpyError::UserNotFound(_) => 404,
            ChirpyError::Conflict(_) => 409,
            ChirpyError::Io(_)
            | ChirpyError::Format(_)
            | ChirpyError::Corrupt(_)
            | ChirpyError::Credential(_)
            | ChirpyError::LockTimeout(_)
            | ChirpyError::Config(_) => 500,
        }
    }

    /// True for errors caused by the request rather than by the server.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, ChirpyError>;
