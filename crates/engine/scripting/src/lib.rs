//! Sandboxed Lua scripting for Worldkit
//!
//! This crate provides:
//! - **CapabilityPolicy**: allow-list restriction of the interpreter's
//!   standard library, applied once per interpreter instance
//! - **Value marshalling**: bounded, copy-based conversion between host and
//!   interpreter values (object views, vectors, scalars)
//! - **SandboxHost**: one isolated interpreter per scripted object, with
//!   lifecycle entry points, fault isolation and a best-effort execution
//!   budget
//! - **Host bridge**: the `gameobject`/`input`/`mouse_delta`/`find_object`
//!   surface injected into script scope
//! - **InputSnapshot**: frame-stable, fully-populated keyboard/pointer state
//!
//! # Example
//!
//! ```rust,ignore
//! use scripting::SandboxHost;
//!
//! let mut host = SandboxHost::new(object_id);
//! host.initialize()?;
//! host.load_script(&source, "spin")?;
//! host.set_game_object(&view)?;
//! host.on_update(dt);
//! if let Some(transform) = host.read_back_transform() {
//!     // flush writable fields back to the authoritative object
//! }
//! ```

mod bridge;
mod error;
mod input;
mod marshal;
mod policy;
mod sandbox;

pub use bridge::{
    install_find_object, install_input, ObjectResolver, FIND_OBJECT_FN, GAMEOBJECT_GLOBAL,
    INPUT_GLOBAL, MOUSE_DELTA_GLOBAL,
};
pub use error::{Error, Result};
pub use input::{InputSnapshot, RECOGNIZED_KEYS};
pub use marshal::{
    push_object_view, push_vec3, read_transform, read_vec3, to_host_value, HostValue, ObjectView,
    MAX_MARSHAL_DEPTH,
};
pub use policy::{CapabilityPolicy, CAPABILITY_DENIED_PREFIX, DENIED_ENTRY_POINTS};
pub use sandbox::{
    CallBudget, ErrorInfo, SandboxHost, DEFAULT_FAULT_DISABLE_THRESHOLD, ON_COLLISION, ON_START,
    ON_TRIGGER_ENTER, ON_UPDATE, SCRIPT_MEMORY_LIMIT,
};

// Re-export mlua for downstream crates
pub use mlua;
