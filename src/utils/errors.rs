//! Custom error types for the mutation engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Manifest not found: {0}")]
    ManifestNotFound(String),

    #[error("Restore error: {0}")]
    Restore(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
