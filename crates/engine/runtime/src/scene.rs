//! Scene runtime
//!
//! Owns the live object registry and one sandbox host per scripted object,
//! and drives the fixed per-frame update loop: publish the frame's input,
//! project each object into its script, run `on_update`, flush transform
//! mutations back to the authoritative object. Script execution is serial
//! and synchronous, in instantiation order; delta-time and the input
//! snapshot are fixed for the whole frame.

use crate::{Error, Result};
use scripting::{ErrorInfo, HostValue, InputSnapshot, ObjectResolver, ObjectView, SandboxHost};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};
use worldkit_world::{GameSpec, ObjectRegistry, Transform};

/// Fault state of one scripted object, for diagnostics UI
#[derive(Debug, Clone)]
pub struct FaultEntry {
    /// Runtime object id
    pub object_id: u64,
    /// Object display name
    pub object_name: String,
    /// Script id loaded into the object's sandbox
    pub script_id: Option<String>,
    /// Current fault record
    pub info: ErrorInfo,
}

/// Cross-object lookup backed by the live registry.
///
/// Holds its own handle so the `find_object` closure inside each sandbox
/// can take short read locks; the runtime never holds a registry lock
/// across a script call.
struct RegistryResolver {
    registry: Arc<RwLock<ObjectRegistry>>,
}

impl ObjectResolver for RegistryResolver {
    fn find_object(&self, name: &str) -> Option<ObjectView> {
        let registry = self.registry.read().ok()?;
        registry.find_by_name(name).map(ObjectView::from_object)
    }
}

/// The running scene: live objects plus their sandboxes.
pub struct SceneRuntime {
    registry: Arc<RwLock<ObjectRegistry>>,
    input: InputSnapshot,
    hosts: Vec<SandboxHost>,
}

impl SceneRuntime {
    /// Create an empty scene
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(ObjectRegistry::new())),
            input: InputSnapshot::new(),
            hosts: Vec::new(),
        }
    }

    /// Load the document's first world
    pub fn load_game(&mut self, spec: &GameSpec) -> Result<()> {
        let world_id = spec.default_world().ok_or(Error::NoWorlds)?.id.clone();
        self.load_world(spec, &world_id)
    }

    /// Load a specific world, tearing down any previously loaded scene.
    ///
    /// Every scripted object gets a freshly allocated sandbox; interpreter
    /// states are never reused across loads. A script that fails to load
    /// degrades that one object to "no behavior"; the scene still loads.
    pub fn load_world(&mut self, spec: &GameSpec, world_id: &str) -> Result<()> {
        let world = spec
            .find_world(world_id)
            .ok_or_else(|| Error::WorldNotFound(world_id.to_string()))?;

        self.shutdown();

        let resolver: Arc<dyn ObjectResolver> = Arc::new(RegistryResolver {
            registry: self.registry.clone(),
        });

        let mut scripted = 0usize;
        for object_spec in &world.objects {
            let id = {
                let Ok(mut registry) = self.registry.write() else {
                    continue;
                };
                registry.spawn(object_spec)
            };

            let Some(script_id) = &object_spec.script_id else {
                continue;
            };

            let mut host = SandboxHost::new(id);
            host.initialize()?;
            host.bind_resolver(resolver.clone())?;

            match spec.find_script(script_id) {
                Some(script) => {
                    // Load failure is already logged by the host; the object
                    // keeps rendering with its last good transform.
                    let _ = host.load_script(&script.source, &script.id);
                }
                None => {
                    warn!(
                        object = id,
                        script = %script_id,
                        "object references an unknown script"
                    );
                }
            }

            scripted += 1;
            self.hosts.push(host);
        }

        info!(
            "Loaded world '{}' with {} objects ({} scripted)",
            world.name,
            world.objects.len(),
            scripted
        );
        Ok(())
    }

    /// Run the one-time `on_start` pass over all scripted objects
    pub fn start(&mut self) {
        let input = self.input.clone();
        for index in 0..self.hosts.len() {
            self.step_host(index, &input, |host| host.on_start());
        }
    }

    /// Advance the scene by one frame.
    ///
    /// Every object observes the same `dt` and the same input state; the
    /// pointer delta resets once the frame completes.
    pub fn update(&mut self, dt: f32) {
        let input = self.input.clone();
        for index in 0..self.hosts.len() {
            self.step_host(index, &input, |host| host.on_update(dt));
        }
        self.input.end_frame();
    }

    /// Dispatch a collision between two objects to the first one's script
    pub fn notify_collision(&mut self, object_id: u64, other_id: u64) {
        self.dispatch_contact(object_id, other_id, |host, other| host.on_collision(other));
    }

    /// Dispatch a trigger-volume entry to the first object's script
    pub fn notify_trigger_enter(&mut self, object_id: u64, other_id: u64) {
        self.dispatch_contact(object_id, other_id, |host, other| {
            host.on_trigger_enter(other)
        });
    }

    /// Record a key press (names are normalized to lowercase)
    pub fn key_down(&mut self, key: &str) {
        self.input.key_down(key);
    }

    /// Record a key release
    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    /// Accumulate pointer movement for the current frame
    pub fn add_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.input.add_mouse_delta(dx, dy);
    }

    /// Remove an object and destroy its sandbox
    pub fn remove_object(&mut self, object_id: u64) {
        if let Some(index) = self.hosts.iter().position(|h| h.object_id() == object_id) {
            let mut host = self.hosts.remove(index);
            host.destroy();
        }
        if let Ok(mut registry) = self.registry.write() {
            registry.remove(object_id);
        }
    }

    /// Tear the scene down: destroy every sandbox deterministically, clear
    /// the registry and reset input. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        for host in &mut self.hosts {
            host.destroy();
        }
        self.hosts.clear();
        if let Ok(mut registry) = self.registry.write() {
            registry.clear();
        }
        self.input.reset();
    }

    /// Shared handle to the live registry (renderer-facing)
    pub fn registry(&self) -> Arc<RwLock<ObjectRegistry>> {
        self.registry.clone()
    }

    /// Authoritative transform of an object, if it exists
    pub fn object_transform(&self, object_id: u64) -> Option<Transform> {
        let registry = self.registry.read().ok()?;
        registry.get(object_id).map(|o| o.transform)
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.registry.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Fault state of every scripted object
    pub fn fault_report(&self) -> Vec<FaultEntry> {
        let registry = self.registry.read().ok();
        self.hosts
            .iter()
            .map(|host| {
                let object_name = registry
                    .as_ref()
                    .and_then(|r| r.get(host.object_id()))
                    .map(|o| o.name.clone())
                    .unwrap_or_default();
                FaultEntry {
                    object_id: host.object_id(),
                    object_name,
                    script_id: host.script_id().map(String::from),
                    info: host.error_info(),
                }
            })
            .collect()
    }

    /// Snapshot, invoke and flush one host.
    ///
    /// The registry lock is released before the script runs so that
    /// `find_object` can take its own read locks; the view the script sees
    /// is the authoritative state as of this point in the frame.
    fn step_host(
        &mut self,
        index: usize,
        input: &InputSnapshot,
        call: impl FnOnce(&mut SandboxHost) -> HostValue,
    ) {
        let object_id = self.hosts[index].object_id();
        let view = {
            let Ok(registry) = self.registry.read() else {
                return;
            };
            match registry.get(object_id) {
                Some(object) => ObjectView::from_object(object),
                None => return,
            }
        };

        let host = &mut self.hosts[index];
        if !host.is_loaded() {
            return;
        }
        if host.set_game_object(&view).is_err() {
            return;
        }
        let _ = host.publish_input(input);
        call(host);

        if let Some(transform) = host.read_back_transform() {
            if let Ok(mut registry) = self.registry.write() {
                if let Some(object) = registry.get_mut(object_id) {
                    object.transform = transform;
                }
            }
        }
    }

    fn dispatch_contact(
        &mut self,
        object_id: u64,
        other_id: u64,
        call: impl FnOnce(&mut SandboxHost, &ObjectView) -> HostValue,
    ) {
        let Some(index) = self.hosts.iter().position(|h| h.object_id() == object_id) else {
            return;
        };
        let other = {
            let Ok(registry) = self.registry.read() else {
                return;
            };
            match registry.get(other_id) {
                Some(object) => ObjectView::from_object(object),
                None => return,
            }
        };
        let input = self.input.clone();
        self.step_host(index, &input, |host| call(host, &other));
    }
}

impl Default for SceneRuntime {
    fn default() -> Self {
        Self::new()
    }
}
