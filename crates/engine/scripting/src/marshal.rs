//! Value marshalling between host and interpreter
//!
//! Scripts never hold references into host memory: everything handed to the
//! interpreter is a freshly built Lua table, and everything read back is
//! converted into host-native values. Table conversion is depth-bounded so a
//! cyclic or pathologically nested value becomes a conversion fault instead
//! of unbounded recursion.

use crate::{Error, Result};
use glam::Vec3;
use mlua::{Lua, Table as LuaTable, Value as LuaValue};
use std::collections::HashMap;
use worldkit_world::{GameObject, Transform};

/// Maximum nesting depth accepted when converting interpreter tables
pub const MAX_MARSHAL_DEPTH: usize = 8;

/// A host-native value converted from an interpreter value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    /// Null/absent value; also the no-op result of a lifecycle call
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<HostValue>),
    /// Map of string keys to values
    Map(HashMap<String, HostValue>),
}

impl HostValue {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::String(_) => "string",
            HostValue::Array(_) => "array",
            HostValue::Map(_) => "map",
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::Int(i) => Some(*i as f64),
            HostValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// A transient projection of a live object handed to scripts.
///
/// Constructed fresh before each lifecycle call; identity fields are
/// read-only by convention, transform vectors are the writable surface the
/// orchestrator flushes back after the call.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectView {
    /// Runtime object id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Snapshot of the authoritative transform
    pub transform: Transform,
}

impl ObjectView {
    /// Project a live object into a view
    pub fn from_object(object: &GameObject) -> Self {
        Self {
            id: object.id,
            name: object.name.clone(),
            transform: object.transform,
        }
    }
}

/// Build a `{x, y, z}` table from a host vector
pub fn push_vec3(lua: &Lua, v: Vec3) -> mlua::Result<LuaTable> {
    let table = lua.create_table()?;
    table.raw_set("x", v.x)?;
    table.raw_set("y", v.y)?;
    table.raw_set("z", v.z)?;
    Ok(table)
}

/// Read a `{x, y, z}` table back into a host vector
pub fn read_vec3(table: &LuaTable) -> Result<Vec3> {
    let x: f64 = table
        .get("x")
        .map_err(|e| Error::Conversion(format!("vector field x: {e}")))?;
    let y: f64 = table
        .get("y")
        .map_err(|e| Error::Conversion(format!("vector field y: {e}")))?;
    let z: f64 = table
        .get("z")
        .map_err(|e| Error::Conversion(format!("vector field z: {e}")))?;
    Ok(Vec3::new(x as f32, y as f32, z as f32))
}

/// Build the object-view table scripts see as `gameobject` (and as the
/// `other` parameter of collision/trigger callbacks)
pub fn push_object_view(lua: &Lua, view: &ObjectView) -> mlua::Result<LuaTable> {
    let table = lua.create_table()?;
    table.raw_set("id", view.id)?;
    table.raw_set("name", view.name.as_str())?;

    let transform = lua.create_table()?;
    transform.raw_set("position", push_vec3(lua, view.transform.position)?)?;
    transform.raw_set("rotation", push_vec3(lua, view.transform.rotation)?)?;
    transform.raw_set("scale", push_vec3(lua, view.transform.scale)?)?;
    table.raw_set("transform", transform)?;

    Ok(table)
}

/// Read the writable transform fields back from an object-view table.
///
/// Identity fields are deliberately ignored; only the transform vectors are
/// part of the writable bridge surface.
pub fn read_transform(view: &LuaTable) -> Result<Transform> {
    let transform: LuaTable = view
        .get("transform")
        .map_err(|e| Error::Conversion(format!("transform: {e}")))?;
    let position: LuaTable = transform
        .get("position")
        .map_err(|e| Error::Conversion(format!("transform.position: {e}")))?;
    let rotation: LuaTable = transform
        .get("rotation")
        .map_err(|e| Error::Conversion(format!("transform.rotation: {e}")))?;
    let scale: LuaTable = transform
        .get("scale")
        .map_err(|e| Error::Conversion(format!("transform.scale: {e}")))?;

    Ok(Transform {
        position: read_vec3(&position)?,
        rotation: read_vec3(&rotation)?,
        scale: read_vec3(&scale)?,
    })
}

/// Convert an interpreter value into a host value.
///
/// Scalars convert directly, tables recurse up to [`MAX_MARSHAL_DEPTH`], and
/// every other interpreter type (functions, userdata, threads) maps to
/// `Null` without raising. Excess depth is the one conversion fault.
pub fn to_host_value(value: &LuaValue) -> Result<HostValue> {
    to_host_value_at(value, 0)
}

fn to_host_value_at(value: &LuaValue, depth: usize) -> Result<HostValue> {
    if depth > MAX_MARSHAL_DEPTH {
        return Err(Error::Conversion(format!(
            "value exceeds marshalling depth limit of {MAX_MARSHAL_DEPTH}"
        )));
    }

    match value {
        LuaValue::Nil => Ok(HostValue::Null),
        LuaValue::Boolean(b) => Ok(HostValue::Bool(*b)),
        LuaValue::Integer(i) => Ok(HostValue::Int(*i)),
        LuaValue::Number(n) => Ok(HostValue::Float(*n)),
        LuaValue::String(s) => Ok(HostValue::String(
            s.to_str()
                .map_err(|e| Error::Conversion(format!("string value: {e}")))?
                .to_string(),
        )),
        LuaValue::Table(t) => {
            // Sequential integer keys from 1 mean an array, otherwise a map
            let len = t.raw_len();
            if len > 0 {
                let mut arr = Vec::with_capacity(len);
                for i in 1..=len {
                    let v: LuaValue = t
                        .raw_get(i)
                        .map_err(|e| Error::Conversion(format!("array index {i}: {e}")))?;
                    arr.push(to_host_value_at(&v, depth + 1)?);
                }
                Ok(HostValue::Array(arr))
            } else {
                let mut map = HashMap::new();
                for pair in t.pairs::<String, LuaValue>() {
                    let (k, v) =
                        pair.map_err(|e| Error::Conversion(format!("table key: {e}")))?;
                    map.insert(k, to_host_value_at(&v, depth + 1)?);
                }
                Ok(HostValue::Map(map))
            }
        }
        // Functions, userdata, threads and friends have no host
        // representation; map to null rather than raising.
        _ => Ok(HostValue::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_round_trip() {
        let lua = Lua::new();
        let v = Vec3::new(1.5, -2.0, 3.25);
        let table = push_vec3(&lua, v).unwrap();
        assert_eq!(read_vec3(&table).unwrap(), v);
    }

    #[test]
    fn test_read_vec3_malformed() {
        let lua = Lua::new();
        let table = lua.create_table().unwrap();
        table.raw_set("x", 1.0).unwrap();
        // y and z absent
        assert!(matches!(read_vec3(&table), Err(Error::Conversion(_))));
    }

    #[test]
    fn test_object_view_round_trip() {
        let lua = Lua::new();
        let view = ObjectView {
            id: 7,
            name: "cube".to_string(),
            transform: Transform::at_position(Vec3::new(1.0, 2.0, 3.0)),
        };
        let table = push_object_view(&lua, &view).unwrap();

        let id: u64 = table.get("id").unwrap();
        let name: String = table.get("name").unwrap();
        assert_eq!(id, 7);
        assert_eq!(name, "cube");

        let transform = read_transform(&table).unwrap();
        assert_eq!(transform, view.transform);
    }

    #[test]
    fn test_to_host_value_scalars() {
        let lua = Lua::new();
        assert_eq!(to_host_value(&LuaValue::Nil).unwrap(), HostValue::Null);
        assert_eq!(
            to_host_value(&LuaValue::Boolean(true)).unwrap(),
            HostValue::Bool(true)
        );
        assert_eq!(
            to_host_value(&LuaValue::Integer(42)).unwrap(),
            HostValue::Int(42)
        );
        assert_eq!(
            to_host_value(&LuaValue::Number(1.5)).unwrap(),
            HostValue::Float(1.5)
        );

        let s = lua.create_string("hi").unwrap();
        assert_eq!(
            to_host_value(&LuaValue::String(s)).unwrap(),
            HostValue::String("hi".to_string())
        );
    }

    #[test]
    fn test_to_host_value_unsupported_maps_to_null() {
        let lua = Lua::new();
        let f = lua.create_function(|_, ()| Ok(())).unwrap();
        assert_eq!(
            to_host_value(&LuaValue::Function(f)).unwrap(),
            HostValue::Null
        );
    }

    #[test]
    fn test_to_host_value_tables() {
        let lua = Lua::new();
        let value: LuaValue = lua
            .load(r#"return { 1, 2, 3 }"#)
            .eval()
            .unwrap();
        assert_eq!(
            to_host_value(&value).unwrap(),
            HostValue::Array(vec![
                HostValue::Int(1),
                HostValue::Int(2),
                HostValue::Int(3)
            ])
        );

        let value: LuaValue = lua
            .load(r#"return { speed = 2.5, name = "cube" }"#)
            .eval()
            .unwrap();
        match to_host_value(&value).unwrap() {
            HostValue::Map(map) => {
                assert_eq!(map.get("speed"), Some(&HostValue::Float(2.5)));
                assert_eq!(
                    map.get("name"),
                    Some(&HostValue::String("cube".to_string()))
                );
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_cyclic_table_is_conversion_fault() {
        let lua = Lua::new();
        let value: LuaValue = lua
            .load(r#"local t = {} t.child = t return t"#)
            .eval()
            .unwrap();
        assert!(matches!(
            to_host_value(&value),
            Err(Error::Conversion(_))
        ));
    }
}
