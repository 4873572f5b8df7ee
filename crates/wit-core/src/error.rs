//! Error types for wit-core.

use thiserror::Error;

/// Result type alias for wit-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in wit-core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A field snapshot failed shape validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A `name=value` assignment could not be parsed.
    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),

    /// An identifier was not in the expected format.
    #[error("invalid id '{value}': {reason}")]
    InvalidId { value: String, reason: String },

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
