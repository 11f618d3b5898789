//! Error types for pairmaker-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Field out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid tick size: {0}")]
    InvalidTickSize(u64),

    #[error("Malformed exchange event: {0}")]
    MalformedEvent(#[from] serde_json::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
