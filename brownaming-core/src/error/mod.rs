//! Core error types for Brownaming

use thiserror::Error;

/// Main error type for Brownaming operations
#[derive(Error, Debug)]
pub enum BrownamingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Lookup tables are missing or malformed. Never recoverable within a run.
    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The external aligner exited with a failure status
    #[error("Alignment error: {0}")]
    Alignment(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for Brownaming operations
pub type BrownamingResult<T> = Result<T, BrownamingError>;

impl From<serde_json::Error> for BrownamingError {
    fn from(err: serde_json::Error) -> Self {
        BrownamingError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for BrownamingError {
    fn from(err: anyhow::Error) -> Self {
        BrownamingError::Other(err.to_string())
    }
}
