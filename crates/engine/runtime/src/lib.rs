//! Scene runtime for Worldkit
//!
//! This crate provides:
//! - **SceneRuntime**: the orchestrator owning live objects and one sandbox
//!   per scripted object, driving the fixed per-frame lifecycle
//! - **FaultEntry**: per-object fault state for diagnostics UI
//!
//! The runtime is single-threaded and cooperative: scripts execute serially
//! within the frame callback, in instantiation order, and never concurrently
//! with each other or with rendering.
//!
//! # Example
//!
//! ```rust,ignore
//! use worldkit_runtime::SceneRuntime;
//! use worldkit_world::GameSpec;
//!
//! let spec = GameSpec::from_json(&json)?;
//! let mut scene = SceneRuntime::new();
//! scene.load_game(&spec)?;
//! scene.start();
//! loop {
//!     scene.update(dt);
//! }
//! ```

mod error;
mod scene;

pub use error::{Error, Result};
pub use scene::{FaultEntry, SceneRuntime};
