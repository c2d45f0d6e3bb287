//! Error types for the world model

use thiserror::Error;

/// Result type for world operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or instantiating a game document
#[derive(Error, Debug)]
pub enum Error {
    /// GameSpec JSON parsing error
    #[error("GameSpec parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Referenced world id does not exist in the document
    #[error("World not found: {0}")]
    WorldNotFound(String),

    /// Referenced script id does not exist in the document
    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    /// Referenced object does not exist in the registry
    #[error("Object not found: {0}")]
    ObjectNotFound(u64),
}
