//! Error types for the scripting sandbox

use thiserror::Error;

/// Result type for sandbox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can escape the sandbox's public methods.
///
/// Script-originated runtime faults never appear here: they are absorbed
/// into the host's fault record and surface through `ErrorInfo` instead.
#[derive(Error, Debug)]
pub enum Error {
    /// The interpreter state could not be constructed or configured.
    /// This is the only error `initialize` produces and it is fatal to the
    /// host instance.
    #[error("scripting environment unavailable: {0}")]
    Environment(String),

    /// Script source failed to compile, or its top-level chunk raised
    #[error("script '{script_id}' failed to load: {message}")]
    Load { script_id: String, message: String },

    /// Marshalling between host and interpreter values failed
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Host-side Lua plumbing error
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    /// Operation requires an initialized interpreter state
    #[error("sandbox host is not initialized")]
    NotInitialized,
}
