//! Capability policy for untrusted scripts
//!
//! The policy is an explicit allow-list: only the arithmetic, string, table
//! and UTF-8 libraries are opened when the interpreter state is created.
//! Everything else (file I/O, process control, debug introspection, module
//! loading, dynamic code loading) is unreachable by construction, not by
//! enumeration. A handful of always-denied entry points that live in the Lua
//! base library are replaced with stubs that raise a "capability denied"
//! fault, so touching them produces a diagnosable message instead of a bare
//! nil index.

use mlua::{Lua, LuaOptions, StdLib, Value as LuaValue, Variadic};

/// Prefix carried by every fault raised for a denied capability
pub const CAPABILITY_DENIED_PREFIX: &str = "capability denied";

/// Base-library entry points that are always denied.
///
/// These run arbitrary code from strings or files, pull in modules, or poke
/// the garbage collector. Each is replaced by a raising stub: a top-level
/// reference fails the script load, a reference inside a lifecycle function
/// faults at call time.
pub const DENIED_ENTRY_POINTS: &[&str] = &[
    "require",
    "dofile",
    "loadfile",
    "load",
    "loadstring",
    "collectgarbage",
];

/// Globals removed outright so scripts cannot reach the shared namespace
const SCRUBBED_GLOBALS: &[&str] = &["_G"];

/// Allow/deny configuration applied once per interpreter instance.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityPolicy {
    libraries: StdLib,
}

impl Default for CapabilityPolicy {
    fn default() -> Self {
        Self {
            libraries: StdLib::MATH | StdLib::STRING | StdLib::TABLE | StdLib::UTF8,
        }
    }
}

impl CapabilityPolicy {
    /// Create the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh interpreter state restricted by this policy.
    ///
    /// The Lua base library is always present; `io`, `os`, `debug`,
    /// `package` and coroutines are never opened. On top of the allow-list
    /// this installs the deny stubs, scrubs `_G`, reroutes `print` into host
    /// logging and write-protects the shared globals table. Script chunks
    /// execute in a private environment whose reads fall through to these
    /// globals; host-side installs use raw access and bypass the guard.
    pub fn create_state(&self) -> mlua::Result<Lua> {
        let lua = Lua::new_with(self.libraries, LuaOptions::default())?;
        let globals = lua.globals();

        for name in SCRUBBED_GLOBALS {
            globals.raw_set(*name, LuaValue::Nil)?;
        }

        for name in DENIED_ENTRY_POINTS {
            let denied = *name;
            let stub = lua.create_function(move |_, _args: Variadic<LuaValue>| -> mlua::Result<()> {
                Err(mlua::Error::RuntimeError(format!(
                    "{CAPABILITY_DENIED_PREFIX}: {denied}"
                )))
            })?;
            globals.raw_set(denied, stub)?;
        }

        let print = lua.create_function(|_, args: Variadic<LuaValue>| {
            let line = args
                .iter()
                .map(display_value)
                .collect::<Vec<_>>()
                .join("\t");
            tracing::info!(target: "script", "{}", line);
            Ok(())
        })?;
        globals.raw_set("print", print)?;

        // Reject ambient writes to the shared globals. Scripts get their own
        // environment table, so this only triggers if a script obtains a
        // reference to the globals and tries to mutate it.
        let guard = lua.create_table()?;
        let newindex =
            lua.create_function(|_, (_table, key, _value): (LuaValue, LuaValue, LuaValue)| {
                Err::<(), _>(mlua::Error::RuntimeError(format!(
                    "{CAPABILITY_DENIED_PREFIX}: global environment is read-only (assignment to '{}')",
                    display_value(&key)
                )))
            })?;
        guard.raw_set("__newindex", newindex)?;
        let _ = globals.set_metatable(Some(guard));

        Ok(lua)
    }

    /// Whether a fault message originated from a denied capability
    pub fn is_capability_denied(message: &str) -> bool {
        message.contains(CAPABILITY_DENIED_PREFIX)
    }
}

/// Render a Lua value for log output
fn display_value(value: &LuaValue) -> String {
    match value {
        LuaValue::Nil => "nil".to_string(),
        LuaValue::Boolean(b) => b.to_string(),
        LuaValue::Integer(i) => i.to_string(),
        LuaValue::Number(n) => n.to_string(),
        LuaValue::String(s) => s
            .to_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|_| "<binary string>".to_string()),
        other => other.type_name().to_string(),
    }
}
