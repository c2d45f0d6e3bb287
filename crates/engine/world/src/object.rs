//! Live objects and the scene registry
//!
//! A `GameObject` is the authoritative, host-owned instance of an
//! `ObjectSpec`. Scripts never hold references into this state; the
//! scripting layer works on marshalled snapshots and the runtime flushes
//! writable fields back here after each lifecycle call.

use crate::{ObjectSpec, Transform};

/// A live object in the running scene
#[derive(Debug, Clone)]
pub struct GameObject {
    /// Runtime id, unique within one loaded scene
    pub id: u64,
    /// Display name from the document
    pub name: String,
    /// Authoritative transform
    pub transform: Transform,
    /// Behavior script reference, if any
    pub script_id: Option<String>,
}

/// Insertion-ordered collection of live objects.
///
/// Iteration order is instantiation order, which is what gives scripts a
/// stable, deterministic update order within a frame.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<GameObject>,
    next_id: u64,
}

impl ObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate an object from its spec entry, returning its runtime id
    pub fn spawn(&mut self, spec: &ObjectSpec) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.objects.push(GameObject {
            id,
            name: spec.name.clone(),
            transform: spec.transform.into(),
            script_id: spec.script_id.clone(),
        });
        id
    }

    /// Remove an object by id
    pub fn remove(&mut self, id: u64) -> Option<GameObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(index))
    }

    /// Get an object by id
    pub fn get(&self, id: u64) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Get a mutable reference to an object by id
    pub fn get_mut(&mut self, id: u64) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Find the first object with the given display name
    pub fn find_by_name(&self, name: &str) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Iterate objects in instantiation order
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.iter()
    }

    /// Ids in instantiation order
    pub fn ids(&self) -> Vec<u64> {
        self.objects.iter().map(|o| o.id).collect()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove all objects
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransformSpec;

    fn spec(name: &str) -> ObjectSpec {
        ObjectSpec {
            name: name.to_string(),
            transform: TransformSpec::default(),
            components: Vec::new(),
            script_id: None,
        }
    }

    #[test]
    fn test_spawn_assigns_unique_ids() {
        let mut registry = ObjectRegistry::new();
        let a = registry.spawn(&spec("a"));
        let b = registry.spawn(&spec("b"));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_iteration_is_instantiation_order() {
        let mut registry = ObjectRegistry::new();
        registry.spawn(&spec("first"));
        registry.spawn(&spec("second"));
        registry.spawn(&spec("third"));

        let names: Vec<_> = registry.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_find_by_name() {
        let mut registry = ObjectRegistry::new();
        let id = registry.spawn(&spec("cube"));
        assert_eq!(registry.find_by_name("cube").unwrap().id, id);
        assert!(registry.find_by_name("missing").is_none());
    }

    #[test]
    fn test_remove() {
        let mut registry = ObjectRegistry::new();
        let id = registry.spawn(&spec("cube"));
        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert!(registry.is_empty());
    }
}
