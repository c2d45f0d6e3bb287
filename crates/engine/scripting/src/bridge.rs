//! Host bridge bindings injected into script scope
//!
//! These are the conventional global names a script reads: its own object
//! view, the input snapshot, the pointer delta, and the cross-object lookup
//! function. Everything installed here is a marshalled copy; nothing aliases
//! live host state.

use crate::marshal::{self, ObjectView};
use crate::InputSnapshot;
use mlua::{Lua, Table as LuaTable, Value as LuaValue};
use std::sync::Arc;

/// Global name of the calling object's view
pub const GAMEOBJECT_GLOBAL: &str = "gameobject";
/// Global name of the keyboard snapshot table
pub const INPUT_GLOBAL: &str = "input";
/// Global name of the pointer delta table
pub const MOUSE_DELTA_GLOBAL: &str = "mouse_delta";
/// Global name of the cross-object lookup function
pub const FIND_OBJECT_FN: &str = "find_object";

/// Cross-object lookup into the live scene.
///
/// Implemented by the scene runtime over its registry; the sandbox only ever
/// receives a fresh [`ObjectView`] per hit, so scripts cannot retain host
/// references across frames.
pub trait ObjectResolver: Send + Sync {
    /// Find a live object by display name
    fn find_object(&self, name: &str) -> Option<ObjectView>;
}

/// Install `find_object` into a script environment
pub fn install_find_object(
    lua: &Lua,
    env: &LuaTable,
    resolver: Arc<dyn ObjectResolver>,
) -> mlua::Result<()> {
    let lookup = lua.create_function(move |lua, name: String| {
        match resolver.find_object(&name) {
            Some(view) => Ok(LuaValue::Table(marshal::push_object_view(lua, &view)?)),
            None => Ok(LuaValue::Nil),
        }
    })?;
    env.raw_set(FIND_OBJECT_FN, lookup)?;
    Ok(())
}

/// Install the `input` and `mouse_delta` tables into a script environment.
///
/// The key table is rebuilt fully populated each time so scripts can index
/// any recognized key without a nil check.
pub fn install_input(lua: &Lua, env: &LuaTable, snapshot: &InputSnapshot) -> mlua::Result<()> {
    let keys = lua.create_table()?;
    for (name, down) in snapshot.keys() {
        keys.raw_set(name, down)?;
    }
    env.raw_set(INPUT_GLOBAL, keys)?;

    let delta = snapshot.mouse_delta();
    let mouse = lua.create_table()?;
    mouse.raw_set("x", delta.x)?;
    mouse.raw_set("y", delta.y)?;
    env.raw_set(MOUSE_DELTA_GLOBAL, mouse)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RECOGNIZED_KEYS;
    use glam::Vec3;
    use worldkit_world::Transform;

    struct StubResolver;

    impl ObjectResolver for StubResolver {
        fn find_object(&self, name: &str) -> Option<ObjectView> {
            (name == "target").then(|| ObjectView {
                id: 11,
                name: "target".to_string(),
                transform: Transform::at_position(Vec3::new(4.0, 0.0, 0.0)),
            })
        }
    }

    #[test]
    fn test_find_object_hit_and_miss() {
        let lua = Lua::new();
        let env = lua.globals();
        install_find_object(&lua, &env, Arc::new(StubResolver)).unwrap();

        lua.load(
            r#"
            local hit = find_object("target")
            assert(hit ~= nil)
            assert(hit.id == 11)
            assert(hit.name == "target")
            assert(hit.transform.position.x == 4.0)
            assert(find_object("nobody") == nil)
        "#,
        )
        .exec()
        .unwrap();
    }

    #[test]
    fn test_input_table_fully_populated() {
        let lua = Lua::new();
        let env = lua.globals();
        let mut snapshot = InputSnapshot::new();
        snapshot.key_down("w");
        snapshot.add_mouse_delta(3.0, -2.0);
        install_input(&lua, &env, &snapshot).unwrap();

        lua.load(
            r#"
            assert(input["w"] == true)
            assert(input["a"] == false)
            assert(mouse_delta.x == 3.0)
            assert(mouse_delta.y == -2.0)
        "#,
        )
        .exec()
        .unwrap();

        // Every recognized key indexes to a boolean, never nil
        let keys: LuaTable = env.get(INPUT_GLOBAL).unwrap();
        for name in RECOGNIZED_KEYS {
            let v: LuaValue = keys.get(*name).unwrap();
            assert!(
                matches!(v, LuaValue::Boolean(_)),
                "key {:?} should be boolean, got {:?}",
                name,
                v
            );
        }
    }
}
