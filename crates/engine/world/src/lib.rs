//! World model for Worldkit
//!
//! This crate provides:
//! - **GameSpec**: the declarative JSON document describing a playable game
//!   (metadata, players, worlds, objects, scripts)
//! - **GameObject / ObjectRegistry**: authoritative live scene state
//!   instantiated from the document
//! - **Transform**: host-owned position/rotation/scale
//!
//! # Example
//!
//! ```rust,ignore
//! use worldkit_world::{GameSpec, ObjectRegistry};
//!
//! let spec = GameSpec::from_json(&json)?;
//! let mut registry = ObjectRegistry::new();
//! for object in &spec.default_world().unwrap().objects {
//!     registry.spawn(object);
//! }
//! ```

mod error;
mod object;
mod spec;
mod transform;

pub use error::{Error, Result};
pub use object::{GameObject, ObjectRegistry};
pub use spec::{
    CameraProperties, Component, GameMeta, GameSpec, LightProperties, MeshProperties, ObjectSpec,
    PlayerConfig, ScriptSource, TransformSpec, Vec3Spec, WorldSpec,
};
pub use transform::Transform;
