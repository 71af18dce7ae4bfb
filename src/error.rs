//! Error types for the gap-filling engine.

use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open store at {path}: {message}")]
    Open { path: String, message: String },

    #[error("Store read failed: {0}")]
    Read(String),

    #[error("Store write failed: {0}")]
    Write(String),

    #[error("Failed to encode record: {0}")]
    Encode(String),

    #[error("Failed to decode record: {0}")]
    Decode(String),

    #[error("Invalid taxonomy data: {0}")]
    InvalidTaxonomy(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(io) => StorageError::IoError(io),
            other => StorageError::Read(other.to_string()),
        }
    }
}

/// Engine errors. Every variant is contained at the per-slot boundary of the scheduler.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or invalid configuration, e.g. no provider credential.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure or non-success status from the generation API.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider envelope carried no completion text.
    #[error("Provider returned no completion text")]
    EmptyResponse,

    /// The completion text did not contain a parsable JSON object.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Writing a generation result failed for a reason other than a uniqueness conflict.
    #[error("Persist error: {0}")]
    Persist(StorageError),

    /// Reading the taxonomy or the result index failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl EngineError {
    /// Stable label used in log fields and counters.
    pub fn class(&self) -> &'static str {
        match self {
            EngineError::Config(_) => "config",
            EngineError::Transport(_) => "transport",
            EngineError::EmptyResponse => "empty_response",
            EngineError::MalformedResponse(_) => "malformed_response",
            EngineError::Persist(_) => "persist",
            EngineError::Storage(_) => "storage",
        }
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}
