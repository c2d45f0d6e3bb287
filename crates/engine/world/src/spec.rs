//! GameSpec document model
//!
//! The GameSpec is the declarative JSON description of a playable game:
//! metadata, player configuration, one or more worlds full of objects, and
//! the script sources objects may reference by id. The document is parsed
//! once and treated as immutable; the runtime instantiates live objects from
//! it and never writes back.

use crate::Transform;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete game document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSpec {
    /// Game metadata
    #[serde(default)]
    pub meta: GameMeta,
    /// Player configuration
    #[serde(default)]
    pub players: PlayerConfig,
    /// Worlds contained in this game
    #[serde(default)]
    pub worlds: Vec<WorldSpec>,
    /// Script sources referenced by objects via `script_id`
    #[serde(default)]
    pub scripts: Vec<ScriptSource>,
}

impl GameSpec {
    /// Parse a GameSpec from a JSON string
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Find a script source by id
    pub fn find_script(&self, id: &str) -> Option<&ScriptSource> {
        self.scripts.iter().find(|s| s.id == id)
    }

    /// Find a world by id
    pub fn find_world(&self, id: &str) -> Option<&WorldSpec> {
        self.worlds.iter().find(|w| w.id == id)
    }

    /// The first world in the document, if any
    pub fn default_world(&self) -> Option<&WorldSpec> {
        self.worlds.first()
    }
}

/// Game metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMeta {
    /// Display name of the game
    #[serde(default)]
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional authoring version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Spawn position
    #[serde(default)]
    pub spawn: Vec3Spec,
    /// Movement speed in units per second
    #[serde(default = "default_player_speed")]
    pub speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3Spec::default(),
            speed: default_player_speed(),
        }
    }
}

fn default_player_speed() -> f32 {
    5.0
}

/// A single world within a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSpec {
    /// Unique world id
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Objects placed in this world
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

/// An object entry in a world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSpec {
    /// Display name, used by `find_object` lookups
    pub name: String,
    /// Initial transform
    #[serde(default)]
    pub transform: TransformSpec,
    /// Renderable components attached to this object
    #[serde(default)]
    pub components: Vec<Component>,
    /// Optional behavior script reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
}

/// A renderable component attached to an object.
///
/// Components are a tagged union keyed by `type` with a `properties` bag.
/// The scripting sandbox never sees these; only the rendering adapter
/// consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "properties", rename_all = "snake_case")]
pub enum Component {
    /// A mesh to render
    Mesh(MeshProperties),
    /// A light source
    Light(LightProperties),
    /// A camera
    Camera(CameraProperties),
}

/// Mesh component properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshProperties {
    /// Primitive shape name (box, sphere, plane, ...) or asset reference
    #[serde(default)]
    pub shape: String,
    /// Optional color as a hex string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Remaining authoring fields, preserved for the rendering adapter
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Light component properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LightProperties {
    /// Light kind (point, directional, ambient, ...)
    #[serde(default)]
    pub kind: String,
    /// Light intensity
    #[serde(default)]
    pub intensity: f32,
    /// Remaining authoring fields, preserved for the rendering adapter
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Camera component properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraProperties {
    /// Vertical field of view in degrees
    #[serde(default)]
    pub fov: f32,
    /// Remaining authoring fields, preserved for the rendering adapter
    #[serde(default, flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// An immutable script source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSource {
    /// Unique script id
    pub id: String,
    /// Display name shown in authoring UI
    #[serde(default)]
    pub name: String,
    /// Lua source text
    pub source: String,
}

/// A `{x, y, z}` vector as it appears in the document
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vec3Spec {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl From<Vec3Spec> for Vec3 {
    fn from(v: Vec3Spec) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for Vec3Spec {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Object transform as it appears in the document
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransformSpec {
    #[serde(default)]
    pub position: Vec3Spec,
    #[serde(default)]
    pub rotation: Vec3Spec,
    #[serde(default = "unit_scale")]
    pub scale: Vec3Spec,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            position: Vec3Spec::default(),
            rotation: Vec3Spec::default(),
            scale: unit_scale(),
        }
    }
}

fn unit_scale() -> Vec3Spec {
    Vec3Spec {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    }
}

impl From<TransformSpec> for Transform {
    fn from(t: TransformSpec) -> Self {
        Transform {
            position: t.position.into(),
            rotation: t.rotation.into(),
            scale: t.scale.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "meta": { "name": "Rolling Cube", "version": "1" },
        "players": { "spawn": { "x": 0, "y": 1, "z": 4 } },
        "worlds": [{
            "id": "main",
            "name": "Main World",
            "objects": [
                {
                    "name": "cube",
                    "transform": {
                        "position": { "x": 0, "y": 0.5, "z": 0 }
                    },
                    "components": [
                        { "type": "mesh", "properties": { "shape": "box", "color": "#ff8800" } }
                    ],
                    "script_id": "spin"
                },
                {
                    "name": "sun",
                    "components": [
                        { "type": "light", "properties": { "kind": "directional", "intensity": 1.5 } }
                    ]
                }
            ]
        }],
        "scripts": [
            { "id": "spin", "name": "Spin", "source": "function on_update(dt) end" }
        ]
    }"##;

    #[test]
    fn test_parse_sample() {
        let spec = GameSpec::from_json(SAMPLE).unwrap();
        assert_eq!(spec.meta.name, "Rolling Cube");
        assert_eq!(spec.worlds.len(), 1);

        let world = spec.default_world().unwrap();
        assert_eq!(world.objects.len(), 2);
        assert_eq!(world.objects[0].script_id.as_deref(), Some("spin"));
        assert!(world.objects[1].script_id.is_none());
    }

    #[test]
    fn test_transform_defaults() {
        let spec = GameSpec::from_json(SAMPLE).unwrap();
        let sun = &spec.default_world().unwrap().objects[1];
        let t: Transform = sun.transform.into();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn test_component_tags() {
        let spec = GameSpec::from_json(SAMPLE).unwrap();
        let world = spec.default_world().unwrap();
        match &world.objects[0].components[0] {
            Component::Mesh(mesh) => {
                assert_eq!(mesh.shape, "box");
                assert_eq!(mesh.color.as_deref(), Some("#ff8800"));
            }
            other => panic!("expected mesh component, got {:?}", other),
        }
        match &world.objects[1].components[0] {
            Component::Light(light) => {
                assert_eq!(light.kind, "directional");
                assert!((light.intensity - 1.5).abs() < f32::EPSILON);
            }
            other => panic!("expected light component, got {:?}", other),
        }
    }

    #[test]
    fn test_find_script() {
        let spec = GameSpec::from_json(SAMPLE).unwrap();
        assert!(spec.find_script("spin").is_some());
        assert!(spec.find_script("missing").is_none());
    }

    #[test]
    fn test_unknown_properties_preserved() {
        let json = r#"{
            "worlds": [{
                "id": "w",
                "objects": [{
                    "name": "thing",
                    "components": [
                        { "type": "mesh", "properties": { "shape": "sphere", "radius": 2.5 } }
                    ]
                }]
            }]
        }"#;
        let spec = GameSpec::from_json(json).unwrap();
        match &spec.worlds[0].objects[0].components[0] {
            Component::Mesh(mesh) => {
                assert!(mesh.extra.contains_key("radius"));
            }
            other => panic!("expected mesh component, got {:?}", other),
        }
    }
}
