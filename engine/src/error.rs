//! Error types for the ContactHub engine.

use thiserror::Error;

/// All possible errors from the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Attribute access errors
    #[error("attribute not found: '{name}' (at {path})")]
    AttributeNotFound { name: String, path: String },

    #[error("attribute '{0}' is not a nested object")]
    NotATree(String),

    #[error("attribute '{0}' is not a list")]
    NotAList(String),

    #[error("index {index} out of bounds for '{path}' (len: {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    // Record errors
    #[error("missing identity: {0} has no id")]
    MissingIdentity(String),

    #[error("{kind} not found")]
    NotFound { kind: String },

    // State machine errors
    #[error("operation not permitted: {0}")]
    OperationNotPermitted(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
