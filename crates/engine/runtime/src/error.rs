//! Error types for the scene runtime

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or driving a scene
#[derive(Error, Debug)]
pub enum Error {
    /// World model error
    #[error(transparent)]
    World(#[from] worldkit_world::Error),

    /// Sandbox error that is fatal to scene construction
    #[error(transparent)]
    Script(#[from] scripting::Error),

    /// The document contains no worlds to load
    #[error("GameSpec contains no worlds")]
    NoWorlds,

    /// Requested world id is not in the document
    #[error("World not found: {0}")]
    WorldNotFound(String),
}
