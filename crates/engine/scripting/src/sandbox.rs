//! Per-object sandbox host
//!
//! One `SandboxHost` owns one interpreter state bound to one scripted
//! object. It loads the script's source into a guarded environment, exposes
//! the host bridge, and runs the lifecycle entry points (`on_start`,
//! `on_update`, `on_collision`, `on_trigger_enter`) under fault isolation:
//! nothing a script does can throw out of this type's public methods except
//! `initialize`'s environment error. Runtime faults are absorbed into a
//! fault record; a chronically failing script disables itself.

use crate::marshal::{self, HostValue, ObjectView};
use crate::policy::CapabilityPolicy;
use crate::{bridge, Error, InputSnapshot, ObjectResolver, Result};
use mlua::{HookTriggers, IntoLuaMulti, Lua, Table as LuaTable, Value as LuaValue, VmState};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use worldkit_world::Transform;

/// Lifecycle entry point called once after load
pub const ON_START: &str = "on_start";
/// Lifecycle entry point called every frame with the frame delta
pub const ON_UPDATE: &str = "on_update";
/// Callback invoked when the object collides with another
pub const ON_COLLISION: &str = "on_collision";
/// Callback invoked when the object enters a trigger volume
pub const ON_TRIGGER_ENTER: &str = "on_trigger_enter";

/// Consecutive faults after which a script is disabled
pub const DEFAULT_FAULT_DISABLE_THRESHOLD: u32 = 8;

/// Interpreter memory ceiling per sandbox (bytes)
pub const SCRIPT_MEMORY_LIMIT: usize = 16 * 1024 * 1024;

/// Instructions executed between budget checks
const HOOK_INSTRUCTION_INTERVAL: u32 = 2048;

/// Best-effort execution budget for a single lifecycle call.
///
/// Enforced through an instruction-count hook that checks a wall-clock
/// deadline; a script that blocks inside a single long-running interpreter
/// operation can still overshoot, so this is a mitigation, not a guarantee.
#[derive(Debug, Clone, Copy)]
pub struct CallBudget {
    /// Maximum wall-clock time for one protected call
    pub max_call: Duration,
}

impl Default for CallBudget {
    fn default() -> Self {
        Self {
            max_call: Duration::from_millis(10),
        }
    }
}

/// Host-side view of a sandbox's fault state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorInfo {
    /// Whether any fault has been recorded since the last clear
    pub has_error: bool,
    /// Message of the most recent fault
    pub last_error: Option<String>,
    /// Number of faulting lifecycle calls since the last clear
    pub error_count: u32,
    /// Whether the backoff policy has suppressed further calls
    pub is_disabled: bool,
}

#[derive(Debug, Clone, Default)]
struct FaultRecord {
    has_error: bool,
    last_error: Option<String>,
    error_count: u32,
    streak: u32,
    is_disabled: bool,
}

/// An isolated interpreter instance bound to one scripted object.
///
/// Never shared between objects and never reused across game loads; the
/// scene runtime allocates a fresh host (and therefore a fresh interpreter
/// state) each time a scripted object is instantiated.
pub struct SandboxHost {
    object_id: u64,
    policy: CapabilityPolicy,
    budget: CallBudget,
    disable_threshold: u32,
    lua: Option<Lua>,
    env: Option<LuaTable>,
    resolver: Option<Arc<dyn ObjectResolver>>,
    script_id: Option<String>,
    loaded: bool,
    faults: FaultRecord,
}

impl SandboxHost {
    /// Create an uninitialized host for the given object
    pub fn new(object_id: u64) -> Self {
        Self {
            object_id,
            policy: CapabilityPolicy::default(),
            budget: CallBudget::default(),
            disable_threshold: DEFAULT_FAULT_DISABLE_THRESHOLD,
            lua: None,
            env: None,
            resolver: None,
            script_id: None,
            loaded: false,
            faults: FaultRecord::default(),
        }
    }

    /// Override the capability policy (before `initialize`)
    pub fn with_policy(mut self, policy: CapabilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the per-call execution budget
    pub fn with_budget(mut self, budget: CallBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Override the consecutive-fault disable threshold
    pub fn with_disable_threshold(mut self, threshold: u32) -> Self {
        self.disable_threshold = threshold.max(1);
        self
    }

    /// Id of the object this host belongs to
    pub fn object_id(&self) -> u64 {
        self.object_id
    }

    /// Id of the currently loaded script, if any
    pub fn script_id(&self) -> Option<&str> {
        self.script_id.as_deref()
    }

    /// Whether `initialize` has succeeded and `destroy` has not been called
    pub fn is_initialized(&self) -> bool {
        self.lua.is_some()
    }

    /// Whether a script is loaded and runnable
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Allocate the interpreter state and apply the capability policy.
    ///
    /// This is the one place a sandbox failure propagates: without an
    /// interpreter no further operation is meaningful, so construction
    /// problems surface immediately as [`Error::Environment`].
    pub fn initialize(&mut self) -> Result<()> {
        if self.lua.is_some() {
            return Ok(());
        }

        let lua = self
            .policy
            .create_state()
            .map_err(|e| Error::Environment(e.to_string()))?;
        lua.set_memory_limit(SCRIPT_MEMORY_LIMIT)
            .map_err(|e| Error::Environment(format!("cannot apply memory limit: {e}")))?;

        self.lua = Some(lua);
        Ok(())
    }

    /// Provide the cross-object lookup used by `find_object`
    pub fn bind_resolver(&mut self, resolver: Arc<dyn ObjectResolver>) -> Result<()> {
        if let (Some(lua), Some(env)) = (self.lua.clone(), self.env.clone()) {
            bridge::install_find_object(&lua, &env, resolver.clone())?;
        }
        self.resolver = Some(resolver);
        Ok(())
    }

    /// Compile and run the script's top-level chunk in a fresh guarded
    /// environment, defining its lifecycle functions.
    ///
    /// Idempotent per host: reloading replaces everything the previous
    /// source defined. Compile errors and top-level faults are logged with
    /// the script id and returned as [`Error::Load`]; the object then simply
    /// has no behavior.
    pub fn load_script(&mut self, source: &str, script_id: &str) -> Result<()> {
        let lua = self.lua.clone().ok_or(Error::NotInitialized)?;
        let env = self.make_environment(&lua)?;
        self.script_id = Some(script_id.to_string());

        let chunk = lua
            .load(source)
            .set_name(script_id)
            .set_environment(env.clone());
        let result = call_with_budget(&lua, self.budget.max_call, || chunk.exec());

        self.env = Some(env);
        match result {
            Ok(()) => {
                self.loaded = true;
                debug!(object = self.object_id, script = script_id, "script loaded");
                Ok(())
            }
            Err(e) => {
                self.loaded = false;
                let message = e.to_string();
                warn!(
                    object = self.object_id,
                    script = script_id,
                    "script failed to load: {}",
                    message
                );
                self.faults.has_error = true;
                self.faults.last_error = Some(message.clone());
                Err(Error::Load {
                    script_id: script_id.to_string(),
                    message,
                })
            }
        }
    }

    /// Marshal the object's view and install it as `gameobject`
    pub fn set_game_object(&mut self, view: &ObjectView) -> Result<()> {
        let lua = self.lua.clone().ok_or(Error::NotInitialized)?;
        let env = self.env.clone().ok_or(Error::NotInitialized)?;
        let table = marshal::push_object_view(&lua, view)?;
        env.raw_set(bridge::GAMEOBJECT_GLOBAL, table)?;
        Ok(())
    }

    /// Marshal the frame's input state into `input` and `mouse_delta`
    pub fn publish_input(&mut self, snapshot: &InputSnapshot) -> Result<()> {
        let lua = self.lua.clone().ok_or(Error::NotInitialized)?;
        let env = self.env.clone().ok_or(Error::NotInitialized)?;
        bridge::install_input(&lua, &env, snapshot)?;
        Ok(())
    }

    /// Invoke a script-defined function by name under fault isolation.
    ///
    /// Absent or non-callable names are a no-op, not an error: scripts are
    /// not required to implement every lifecycle callback. Runtime faults
    /// are recorded, logged and converted into a `Null` result; the frame
    /// always continues.
    pub fn call_function(&mut self, name: &str, args: impl IntoLuaMulti) -> HostValue {
        if self.faults.is_disabled || !self.loaded {
            return HostValue::Null;
        }
        let (Some(lua), Some(env)) = (self.lua.clone(), self.env.clone()) else {
            return HostValue::Null;
        };

        let value = match env.raw_get::<LuaValue>(name) {
            Ok(v) => v,
            Err(_) => return HostValue::Null,
        };
        let LuaValue::Function(func) = value else {
            return HostValue::Null;
        };

        match call_with_budget(&lua, self.budget.max_call, || func.call::<LuaValue>(args)) {
            Ok(result) => {
                self.faults.streak = 0;
                match marshal::to_host_value(&result) {
                    Ok(host_value) => host_value,
                    Err(e) => {
                        self.record_fault(name, &e.to_string());
                        HostValue::Null
                    }
                }
            }
            Err(e) => {
                self.record_fault(name, &e.to_string());
                HostValue::Null
            }
        }
    }

    /// Call the script's `on_start` entry point
    pub fn on_start(&mut self) -> HostValue {
        self.call_function(ON_START, ())
    }

    /// Call the script's `on_update` entry point with the frame delta
    pub fn on_update(&mut self, dt: f32) -> HostValue {
        self.call_function(ON_UPDATE, dt)
    }

    /// Call the script's `on_collision` callback with the other participant
    pub fn on_collision(&mut self, other: &ObjectView) -> HostValue {
        self.call_with_view(ON_COLLISION, other)
    }

    /// Call the script's `on_trigger_enter` callback with the other participant
    pub fn on_trigger_enter(&mut self, other: &ObjectView) -> HostValue {
        self.call_with_view(ON_TRIGGER_ENTER, other)
    }

    fn call_with_view(&mut self, name: &str, other: &ObjectView) -> HostValue {
        let Some(lua) = self.lua.clone() else {
            return HostValue::Null;
        };
        let table = match marshal::push_object_view(&lua, other) {
            Ok(t) => t,
            Err(e) => {
                self.record_fault(name, &e.to_string());
                return HostValue::Null;
            }
        };
        self.call_function(name, table)
    }

    /// Read the writable transform fields back from `gameobject`.
    ///
    /// Returns `None` when no script state exists or the script corrupted
    /// the view; in the latter case the conversion fault is recorded and the
    /// object keeps its last good transform.
    pub fn read_back_transform(&mut self) -> Option<Transform> {
        let env = self.env.clone()?;
        let value = env.raw_get::<LuaValue>(bridge::GAMEOBJECT_GLOBAL).ok()?;
        let LuaValue::Table(view) = value else {
            return None;
        };
        match marshal::read_transform(&view) {
            Ok(transform) => Some(transform),
            Err(e) => {
                self.record_fault("read_back_transform", &e.to_string());
                None
            }
        }
    }

    /// Current fault state for diagnostics UI
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo {
            has_error: self.faults.has_error,
            last_error: self.faults.last_error.clone(),
            error_count: self.faults.error_count,
            is_disabled: self.faults.is_disabled,
        }
    }

    /// Reset the fault record, re-enabling a disabled script.
    /// Loaded script state is untouched.
    pub fn clear_errors(&mut self) {
        self.faults = FaultRecord::default();
    }

    /// Release the interpreter state. Idempotent: safe on an
    /// already-destroyed or never-initialized host.
    pub fn destroy(&mut self) {
        if self.lua.is_some() {
            debug!(object = self.object_id, "sandbox destroyed");
        }
        self.env = None;
        self.lua = None;
        self.loaded = false;
    }

    fn make_environment(&self, lua: &Lua) -> Result<LuaTable> {
        let env = lua.create_table()?;
        let meta = lua.create_table()?;
        meta.raw_set("__index", lua.globals())?;
        let _ = env.set_metatable(Some(meta));

        if let Some(resolver) = &self.resolver {
            bridge::install_find_object(lua, &env, resolver.clone())?;
        }
        Ok(env)
    }

    fn record_fault(&mut self, function: &str, message: &str) {
        self.faults.error_count += 1;
        self.faults.streak += 1;
        self.faults.has_error = true;
        self.faults.last_error = Some(message.to_string());

        let script = self.script_id.clone().unwrap_or_default();
        if CapabilityPolicy::is_capability_denied(message) {
            warn!(
                object = self.object_id,
                script = %script,
                function,
                "script touched a denied capability: {}",
                message
            );
        } else {
            warn!(
                object = self.object_id,
                script = %script,
                function,
                "script fault: {}",
                message
            );
        }

        if !self.faults.is_disabled && self.faults.streak >= self.disable_threshold {
            self.faults.is_disabled = true;
            warn!(
                object = self.object_id,
                script = %script,
                "script disabled after {} consecutive faults",
                self.faults.streak
            );
        }
    }
}

impl Drop for SandboxHost {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for SandboxHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxHost")
            .field("object_id", &self.object_id)
            .field("initialized", &self.lua.is_some())
            .field("loaded", &self.loaded)
            .field("script_id", &self.script_id)
            .field("error_count", &self.faults.error_count)
            .field("is_disabled", &self.faults.is_disabled)
            .finish()
    }
}

/// Run a protected call with the instruction/time budget hook armed.
fn call_with_budget<T>(
    lua: &Lua,
    max_duration: Duration,
    f: impl FnOnce() -> mlua::Result<T>,
) -> mlua::Result<T> {
    let started = Instant::now();
    lua.set_hook(
        HookTriggers::new().every_nth_instruction(HOOK_INSTRUCTION_INTERVAL),
        move |_lua, _debug| {
            if started.elapsed() >= max_duration {
                return Err(mlua::Error::RuntimeError(format!(
                    "script exceeded its execution budget ({:.1}ms)",
                    max_duration.as_secs_f64() * 1000.0
                )));
            }
            Ok(VmState::Continue)
        },
    );
    let result = f();
    lua.remove_hook();
    result
}
